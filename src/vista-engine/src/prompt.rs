//! Prompt construction for a describe request.

use serde::{Deserialize, Serialize};

use crate::client::{ContentPart, Message};
use crate::config::DescribeConfig;

/// Text sent alongside the image in the first user message.
pub const DESCRIBE_INSTRUCTION: &str = "Describe this image";

const EXAMPLE_ANSWER: &str = r#"```
title: Fancy Title
description: |
  This image has a cat sitting on a chair.

  In the foreground there are balls of yarn and in the background many books.
descriptive_tags:
  - cat
  - wooden chair
  - yarn
  - bookshelf
  - afternoon light
social_media_tags:
  - CatsOfInstagram
  - CozyCorner
  - ReadingNook
composition: |
  The cat is off to one side. The leading lines of the chair's
  legs draw attention to the cat.
location: |
  This photograph is from Iceland, outside of Vik.
photographer: Dorothea Lange
process: |
  This image appears to be a digital photograph.
```"#;

/// What to describe and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeRequest {
    /// URL of the image.
    pub image_url: String,
    /// Stylistic directive, empty for none.
    pub style: String,
    /// Target description length in words.
    pub word_count: u32,
}

impl DescribeRequest {
    /// Create a request using configured defaults for style and length.
    pub fn new(image_url: impl Into<String>, defaults: &DescribeConfig) -> Self {
        Self {
            image_url: image_url.into(),
            style: defaults.style.clone(),
            word_count: defaults.word_count,
        }
    }

    /// Override the stylistic directive.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Override the target length.
    pub fn with_word_count(mut self, word_count: u32) -> Self {
        self.word_count = word_count;
        self
    }

    /// The system instruction for this request.
    pub fn system_prompt(&self) -> String {
        let style = self.style.trim();
        let style_line = if style.is_empty() {
            String::new()
        } else {
            format!("This should be written in the style of {style}.\n\n")
        };

        format!(
            "You are an image analyst. Describe the image you are given as a YAML record \
with the fields below.\n\n\
{style_line}\
title: a short title for the image.\n\
description: a detailed description of the foreground, background and subjects, \
using descriptive language and about {words} words.\n\
descriptive_tags: as many descriptive tags as possible.\n\
social_media_tags: fun conceptual tags for social media.\n\
composition: a comment on the photographic composition.\n\
location: the likely location, with an estimate of your confidence.\n\
process: whether this is a digital photo or an analog film photo.\n\
photographer: who the photographer of this image is.\n\n\
The YAML should be structured like this:\n\n\
{EXAMPLE_ANSWER}\n\n\
IMPORTANT: Return the result as YAML in a Markdown code block surrounded with three backticks!",
            words = self.word_count,
        )
    }

    /// The first user message: the instruction and the image.
    pub fn user_message(&self) -> Message {
        Message::user_parts(vec![
            ContentPart::text(DESCRIBE_INSTRUCTION),
            ContentPart::image_url(&self.image_url),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MessageContent, MessageRole};
    use pretty_assertions::assert_eq;

    fn request(style: &str) -> DescribeRequest {
        DescribeRequest::new("https://example.com/a.jpg", &DescribeConfig::default())
            .with_style(style)
            .with_word_count(120)
    }

    #[test]
    fn test_style_sentence_only_when_given() {
        assert!(
            request("Ernest Hemingway")
                .system_prompt()
                .contains("in the style of Ernest Hemingway.")
        );
        assert!(!request("").system_prompt().contains("in the style of"));
        assert!(!request("   ").system_prompt().contains("in the style of"));
    }

    #[test]
    fn test_word_count_and_fields_in_prompt() {
        let prompt = request("").system_prompt();
        assert!(prompt.contains("about 120 words"));
        for field in vista_card::fields::ALL {
            assert!(prompt.contains(&format!("{field}:")), "missing {field}");
        }
        assert!(prompt.contains("```"));
    }

    #[test]
    fn test_example_answer_parses() {
        let details = vista_card::parse(EXAMPLE_ANSWER).expect("example is valid YAML");
        assert_eq!(details.title.as_deref(), Some("Fancy Title"));
        assert!(details.extra.is_empty());
    }

    #[test]
    fn test_user_message_carries_image() {
        let message = request("").user_message();
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(
            message.content,
            MessageContent::Parts(vec![
                ContentPart::text("Describe this image"),
                ContentPart::image_url("https://example.com/a.jpg"),
            ])
        );
    }
}
