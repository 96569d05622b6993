//! Streaming image-description cards.
//!
//! A multimodal model describes an image as YAML wrapped in a markdown code
//! fence, and the text arrives a few tokens at a time. This crate holds the
//! two pure stages of turning that text into something displayable:
//!
//! - [`parse`] tolerates fences, hashtags and truncated input, and either
//!   yields an [`ImageDetails`] record or says why it could not.
//! - [`project`] maps a record onto a [`CardViewModel`], the ordered set of
//!   display sections a UI renders.
//!
//! The stateful part (deciding when a parse result may replace what is on
//! screen) lives in `vista-engine`.
//!
//! # Example
//!
//! ```rust,ignore
//! use vista_card::{parse, project};
//!
//! let details = parse("```yaml\ntitle: Lighthouse\n")?;
//! let card = project(&details);
//! assert_eq!(card.title(), Some("Lighthouse"));
//! ```

mod parser;
mod projector;
mod record;
pub mod render;

pub use parser::{ParseFailure, clean, parse, parse_mapping};
pub use projector::{
    Badge, BadgeEmphasis, CardSection, CardViewModel, DetailBlock, DetailKind, project,
};
pub use record::{ImageDetails, fields};
