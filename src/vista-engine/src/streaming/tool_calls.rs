//! Merging streamed tool call fragments.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::client::{ToolCall, ToolCallDelta};
use crate::error::{Result, VistaError};

/// Collects [`ToolCallDelta`]s for one model response.
///
/// Fragments are grouped by index. The first non-empty id and name seen for
/// an index are kept; argument fragments are concatenated in arrival order.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<u32, PendingToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one fragment.
    pub fn push(&mut self, delta: ToolCallDelta) {
        let call = self.calls.entry(delta.index).or_default();
        if call.id.is_empty() {
            if let Some(id) = delta.id.filter(|id| !id.is_empty()) {
                call.id = id;
            }
        }
        if call.name.is_empty() {
            if let Some(name) = delta.name.filter(|name| !name.is_empty()) {
                call.name = name;
            }
        }
        call.arguments.push_str(&delta.arguments);
    }

    /// Returns `true` if no fragment has been pushed.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Number of distinct calls seen.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// The merged calls, in index order.
    ///
    /// Calls that never received an id get `call_{index}`.
    pub fn finish(self) -> Vec<PendingToolCall> {
        self.calls
            .into_iter()
            .map(|(index, mut call)| {
                if call.id.is_empty() {
                    call.id = format!("call_{index}");
                }
                call
            })
            .collect()
    }
}

/// A fully merged tool call, arguments still as raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl PendingToolCall {
    /// Parse the arguments as a JSON object. Empty text is `{}`.
    pub fn parsed_arguments(&self) -> Result<Map<String, Value>> {
        if self.arguments.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&self.arguments) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(VistaError::InvalidToolArguments {
                tool: self.name.clone(),
                message: format!("expected a JSON object, got {other}"),
            }),
            Err(e) => Err(VistaError::InvalidToolArguments {
                tool: self.name.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// The call as recorded in the conversation history.
    pub fn to_tool_call(&self) -> ToolCall {
        let arguments = if self.arguments.trim().is_empty() {
            "{}"
        } else {
            self.arguments.as_str()
        };
        ToolCall::function(&self.id, &self.name, arguments)
    }
}
