//! Tolerant parsing of a partially streamed YAML answer.
//!
//! The buffer handed to [`parse`] is whatever the model has produced so far,
//! so it is usually wrapped in an unterminated markdown fence and cut off in
//! the middle of a token. Two things are cleaned up before the YAML parser
//! sees it:
//!
//! - lines opening or closing a code fence are blanked;
//! - `#` is swapped for a placeholder, because hashtags in prose would
//!   otherwise start a YAML comment and silently truncate the field.
//!   The placeholder is turned back into `#` in every parsed string.
//!
//! YAML's line-oriented grammar does the rest: most truncation points still
//! leave a valid (if incomplete) mapping behind. A top-level key written
//! twice keeps its last value, the way lenient YAML loaders behave.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::record::ImageDetails;

/// Lines starting with a code fence marker, whatever follows it.
static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```.*$").expect("fence regex is valid"));

/// A line opening a top-level mapping entry. Group 1 is the key.
static TOP_LEVEL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][^:\n]*?):(?:\s|$)").expect("key regex is valid"));

/// Private-use character standing in for `#` while the YAML parser runs.
const HASH_PLACEHOLDER: char = '\u{E023}';

/// Why a buffer did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// The text is not (yet) valid YAML.
    #[error("malformed YAML: {0}")]
    Malformed(String),

    /// Valid YAML whose top level is not a mapping.
    ///
    /// Early in a stream the only visible token is often a bare scalar.
    #[error("top-level value is not a mapping")]
    NotARecord,
}

/// Strips fence lines and masks `#` so the text can be handed to the YAML parser.
pub fn clean(buffer: &str) -> String {
    FENCE_LINE
        .replace_all(buffer, "")
        .replace('#', &HASH_PLACEHOLDER.to_string())
}

/// Parses a buffer into a raw YAML mapping.
///
/// Unknown keys and non-string values are returned untouched apart from `#`
/// restoration.
pub fn parse_mapping(buffer: &str) -> Result<Mapping, ParseFailure> {
    let cleaned = clean(buffer);
    if cleaned.trim().is_empty() {
        return Err(ParseFailure::NotARecord);
    }

    let value: Value = match serde_yaml::from_str(&cleaned) {
        Ok(value) => value,
        Err(e) if e.to_string().starts_with("duplicate entry") => {
            serde_yaml::from_str(&drop_shadowed_entries(&cleaned))
                .map_err(|e| ParseFailure::Malformed(e.to_string()))?
        }
        Err(e) => return Err(ParseFailure::Malformed(e.to_string())),
    };

    match restore_hashes(value) {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(ParseFailure::NotARecord),
    }
}

/// Parses a buffer into an [`ImageDetails`] record.
pub fn parse(buffer: &str) -> Result<ImageDetails, ParseFailure> {
    parse_mapping(buffer).map(ImageDetails::from_mapping)
}

/// Removes every top-level entry whose key appears again further down.
///
/// An entry is its key line plus the indented or blank lines after it.
fn drop_shadowed_entries(text: &str) -> String {
    let mut entries: Vec<(Option<&str>, String)> = Vec::new();
    for line in text.split_inclusive('\n') {
        match TOP_LEVEL_KEY.captures(line).and_then(|caps| caps.get(1)) {
            Some(key) => entries.push((Some(key.as_str().trim_end()), line.to_string())),
            None => match entries.last_mut() {
                Some((_, body)) => body.push_str(line),
                None => entries.push((None, line.to_string())),
            },
        }
    }

    let last: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, (key, _))| key.map(|k| (k, i)))
        .collect();

    entries
        .iter()
        .enumerate()
        .filter(|(i, (key, _))| key.is_none_or(|k| last.get(k) == Some(i)))
        .map(|(_, (_, body))| body.as_str())
        .collect()
}

fn restore_hashes(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(restore_str(s)),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(restore_hashes).collect()),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(k, v)| (restore_hashes(k), restore_hashes(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            Value::Tagged(Box::new(TaggedValue {
                tag,
                value: restore_hashes(value),
            }))
        }
        other => other,
    }
}

fn restore_str(s: String) -> String {
    if s.contains(HASH_PLACEHOLDER) {
        s.replace(HASH_PLACEHOLDER, "#")
    } else {
        s
    }
}
