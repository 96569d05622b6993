//! Projection of a parsed record onto a displayable card.
//!
//! [`project`] is total: any record, including an empty one, yields a valid
//! [`CardViewModel`]. Fields that are missing simply leave their section out.

use serde::Serialize;

use crate::record::ImageDetails;

/// Visual weight of a tag badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeEmphasis {
    /// Descriptive tags.
    Secondary,
    /// Social media tags.
    Primary,
}

/// A single tag shown on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub text: String,
    pub emphasis: BadgeEmphasis,
}

impl Badge {
    fn new(text: impl Into<String>, emphasis: BadgeEmphasis) -> Self {
        Self {
            text: text.into(),
            emphasis,
        }
    }
}

/// Which labelled block of the details list a [`DetailBlock`] is.
///
/// Variants are declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    Description,
    Composition,
    Location,
    Photographer,
    Process,
}

impl DetailKind {
    /// Label shown in front of the block.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Composition => "Composition",
            Self::Location => "Location",
            Self::Photographer => "Photographer",
            Self::Process => "Process",
        }
    }
}

/// A labelled block of paragraphs in the details list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailBlock {
    pub kind: DetailKind,
    pub paragraphs: Vec<String>,
}

/// Borrowed view of one card section, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSection<'a> {
    Title(&'a str),
    Tags(&'a [Badge]),
    Detail(&'a DetailBlock),
}

/// What the card shows. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardViewModel {
    title: Option<String>,
    tags: Option<Vec<Badge>>,
    details: Vec<DetailBlock>,
}

impl CardViewModel {
    /// The card shown before anything has been parsed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Header text.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Badges, descriptive tags first.
    pub fn tags(&self) -> Option<&[Badge]> {
        self.tags.as_deref()
    }

    /// Detail blocks in display order.
    pub fn details(&self) -> &[DetailBlock] {
        &self.details
    }

    /// Returns the detail block of the given kind.
    pub fn detail(&self, kind: DetailKind) -> Option<&DetailBlock> {
        self.details.iter().find(|block| block.kind == kind)
    }

    /// Returns `true` if the card has no sections at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.tags.is_none() && self.details.is_empty()
    }

    /// All present sections: title, tags, then each detail block.
    pub fn sections(&self) -> Vec<CardSection<'_>> {
        let mut sections = Vec::with_capacity(2 + self.details.len());
        if let Some(title) = self.title() {
            sections.push(CardSection::Title(title));
        }
        if let Some(tags) = self.tags() {
            sections.push(CardSection::Tags(tags));
        }
        sections.extend(self.details.iter().map(CardSection::Detail));
        sections
    }
}

/// Maps a record onto a card.
pub fn project(details: &ImageDetails) -> CardViewModel {
    let title = details.title.clone().filter(|t| !t.is_empty());

    let mut badges = Vec::new();
    if let Some(tags) = &details.descriptive_tags {
        badges.extend(tags.iter().map(|t| Badge::new(t, BadgeEmphasis::Secondary)));
    }
    if let Some(tags) = &details.social_media_tags {
        badges.extend(tags.iter().map(|t| Badge::new(t, BadgeEmphasis::Primary)));
    }
    let tags = (!badges.is_empty()).then_some(badges);

    let mut blocks = Vec::new();
    if let Some(description) = &details.description {
        blocks.push(DetailBlock {
            kind: DetailKind::Description,
            paragraphs: description.split('\n').map(str::to_string).collect(),
        });
    }
    for (kind, value) in [
        (DetailKind::Composition, &details.composition),
        (DetailKind::Location, &details.location),
        (DetailKind::Photographer, &details.photographer),
        (DetailKind::Process, &details.process),
    ] {
        if let Some(text) = value {
            blocks.push(DetailBlock {
                kind,
                paragraphs: vec![text.clone()],
            });
        }
    }

    CardViewModel {
        title,
        tags,
        details: blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn tags(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_empty_record_projects_to_empty_card() {
        let card = project(&ImageDetails::default());
        assert!(card.is_empty());
        assert_eq!(card, CardViewModel::empty());
    }

    #[test]
    fn test_badges_in_order_with_emphasis() {
        let details = parse("title: X\ndescriptive_tags:\n  - a\n  - b\nsocial_media_tags:\n  - c\n")
            .expect("parses");
        let card = project(&details);

        assert_eq!(
            card.tags(),
            Some(
                &[
                    Badge::new("a", BadgeEmphasis::Secondary),
                    Badge::new("b", BadgeEmphasis::Secondary),
                    Badge::new("c", BadgeEmphasis::Primary),
                ][..]
            )
        );
    }

    #[test]
    fn test_social_tags_without_descriptive_tags() {
        let details = ImageDetails {
            social_media_tags: tags(&["LighthouseLife"]),
            ..Default::default()
        };
        let card = project(&details);
        assert_eq!(
            card.tags(),
            Some(&[Badge::new("LighthouseLife", BadgeEmphasis::Primary)][..])
        );
    }

    #[test]
    fn test_empty_tag_lists_have_no_section() {
        let details = ImageDetails {
            descriptive_tags: Some(vec![]),
            social_media_tags: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(project(&details).tags(), None);
    }

    #[test]
    fn test_empty_title_omitted() {
        let details = ImageDetails {
            title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(project(&details).title(), None);
    }

    #[test]
    fn test_description_lines_become_paragraphs() {
        let details = ImageDetails {
            description: Some("A cat on a chair.\n\nBooks behind.".to_string()),
            ..Default::default()
        };
        let card = project(&details);
        let block = card.detail(DetailKind::Description).expect("description block");
        assert_eq!(
            block.paragraphs,
            vec![
                "A cat on a chair.".to_string(),
                String::new(),
                "Books behind.".to_string()
            ]
        );
    }

    #[test]
    fn test_hash_kept_in_rendered_paragraph() {
        let details = parse("description: |\n  Shot at #golden hour, frame #3.\n").expect("parses");
        let card = project(&details);
        let block = card.detail(DetailKind::Description).expect("description block");
        assert_eq!(block.paragraphs[0], "Shot at #golden hour, frame #3.");
    }

    #[test]
    fn test_sections_follow_fixed_order() {
        let details = ImageDetails {
            title: Some("T".to_string()),
            description: Some("D".to_string()),
            descriptive_tags: tags(&["t"]),
            social_media_tags: None,
            composition: Some("C".to_string()),
            location: Some("L".to_string()),
            photographer: Some("P".to_string()),
            process: Some("R".to_string()),
            extra: Default::default(),
        };
        let card = project(&details);
        let order: Vec<String> = card
            .sections()
            .iter()
            .map(|section| match section {
                CardSection::Title(_) => "title".to_string(),
                CardSection::Tags(_) => "tags".to_string(),
                CardSection::Detail(block) => block.kind.label().to_lowercase(),
            })
            .collect();

        assert_eq!(
            order,
            vec![
                "title",
                "tags",
                "description",
                "composition",
                "location",
                "photographer",
                "process"
            ]
        );
    }

    #[test]
    fn test_one_section_per_present_field() {
        let details = ImageDetails {
            location: Some("Vik".to_string()),
            process: Some("Digital".to_string()),
            ..Default::default()
        };
        let card = project(&details);
        assert_eq!(card.sections().len(), 2);
        assert_eq!(card.title(), None);
        assert_eq!(card.details()[0].kind, DetailKind::Location);
        assert_eq!(card.details()[1].kind, DetailKind::Process);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let details = parse("title: Cat\ncomposition: Off-center\n").expect("parses");
        assert_eq!(project(&details), project(&details));
    }
}
