//! Per-session message history.

use crate::client::{Message, MessageRole, ToolCall};

/// Ordered history of one conversation about one image.
///
/// The system instruction is always first. Everything after it is appended
/// in the order it happened: user turns, assistant answers, assistant tool
/// requests and their results.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with a system instruction.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// All messages, system first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, including the system instruction.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the system instruction is present from the start.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a prepared message (e.g. a multi-part user message).
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a plain-text user message.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Message::user(text));
    }

    /// Append the assistant's answer for a finished response.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Message::assistant(text));
    }

    /// Append an assistant response that requested tools.
    pub fn push_tool_calls(&mut self, text: impl Into<String>, calls: Vec<ToolCall>) {
        self.push(Message::assistant_tool_calls(text, calls));
    }

    /// Append a tool's output.
    pub fn push_tool_result(&mut self, call_id: impl Into<String>, output: impl Into<String>) {
        self.push(Message::tool_result(call_id, output));
    }

    /// Number of user turns so far.
    pub fn user_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_first_then_in_order() {
        let mut conversation = Conversation::new("be brief");
        conversation.push_user("Describe this image");
        conversation.push_tool_calls("", vec![ToolCall::function("c1", "exiftool", "{}")]);
        conversation.push_tool_result("c1", "Image Width : 10");
        conversation.push_assistant("title: X");
        conversation.push_user("Where was it taken?");

        let roles: Vec<MessageRole> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::Assistant,
                MessageRole::User,
            ]
        );
        assert_eq!(conversation.user_turns(), 2);
        assert!(!conversation.is_empty());
    }
}
