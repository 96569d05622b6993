//! The record a model's YAML answer is read into.
//!
//! Every recognized key gets its own optional slot, so "the model has not
//! written this yet" is a `None` rather than a failed map lookup. Keys the
//! model invents are kept verbatim in [`ImageDetails::extra`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Recognized top-level keys.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const DESCRIPTIVE_TAGS: &str = "descriptive_tags";
    pub const SOCIAL_MEDIA_TAGS: &str = "social_media_tags";
    pub const COMPOSITION: &str = "composition";
    pub const LOCATION: &str = "location";
    pub const PHOTOGRAPHER: &str = "photographer";
    pub const PROCESS: &str = "process";

    /// All recognized keys, in card order.
    pub const ALL: [&str; 8] = [
        TITLE,
        DESCRIPTIVE_TAGS,
        SOCIAL_MEDIA_TAGS,
        DESCRIPTION,
        COMPOSITION,
        LOCATION,
        PHOTOGRAPHER,
        PROCESS,
    ];
}

/// Details about an image, as far as the model has written them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageDetails {
    /// Short title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Multi-line description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Descriptive tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptive_tags: Option<Vec<String>>,
    /// Social media tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_media_tags: Option<Vec<String>>,
    /// Comment on photographic composition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<String>,
    /// Guessed location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Guessed photographer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,
    /// Digital or analog process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    /// Keys outside the recognized set, kept as parsed.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ImageDetails {
    /// Reads a parsed YAML mapping into the record.
    ///
    /// Null values leave their slot empty. Scalars other than strings
    /// (`photographer: 1984`) are kept as their textual form. A tag field
    /// written as a single scalar becomes a one-element list.
    pub fn from_mapping(mapping: Mapping) -> Self {
        let mut details = Self::default();

        for (key, value) in mapping {
            let Some(key) = scalar_text(&key) else {
                continue;
            };

            match key.as_str() {
                fields::TITLE => details.title = text(&value),
                fields::DESCRIPTION => details.description = text(&value),
                fields::DESCRIPTIVE_TAGS => details.descriptive_tags = text_list(&value),
                fields::SOCIAL_MEDIA_TAGS => details.social_media_tags = text_list(&value),
                fields::COMPOSITION => details.composition = text(&value),
                fields::LOCATION => details.location = text(&value),
                fields::PHOTOGRAPHER => details.photographer = text(&value),
                fields::PROCESS => details.process = text(&value),
                _ => {
                    details.extra.insert(key, value);
                }
            }
        }

        details
    }

    /// Returns `true` if no slot holds a value.
    ///
    /// A recognized key written with a null value leaves its slot empty, so
    /// `title:` alone is empty too. Unknown keys count as values.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.descriptive_tags.is_none()
            && self.social_media_tags.is_none()
            && self.composition.is_none()
            && self.location.is_none()
            && self.photographer.is_none()
            && self.process.is_none()
            && self.extra.is_empty()
    }
}

/// Text of a scalar value, `None` for null and collections.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Text of a prose field. A list is joined line by line.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => {
            let lines: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        Value::Tagged(tagged) => text(&tagged.value),
        other => scalar_text(other),
    }
}

/// Entries of a tag field. Null items (a `-` with nothing after it yet) are skipped.
fn text_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => None,
        Value::Sequence(items) => Some(items.iter().filter_map(scalar_text).collect()),
        Value::Tagged(tagged) => text_list(&tagged.value),
        other => scalar_text(other).map(|s| vec![s]),
    }
}
