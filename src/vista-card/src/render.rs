//! Rendering a [`CardViewModel`] for display.
//!
//! Two targets: an HTML fragment using Bootstrap card classes (for a web
//! front end) and wrapped plain text (for the terminal).

use html_escape::encode_text;

use crate::projector::{BadgeEmphasis, CardSection, CardViewModel};

impl BadgeEmphasis {
    /// Bootstrap background class for the badge.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Secondary => "bg-secondary",
            Self::Primary => "bg-primary",
        }
    }
}

impl CardViewModel {
    /// Renders the card as an HTML fragment. All text is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"card\">");
        let mut details_open = false;

        for section in self.sections() {
            match section {
                CardSection::Title(title) => {
                    html.push_str("<div class=\"card-header bg-dark fw-bold fs-3\">");
                    html.push_str(&encode_text(title));
                    html.push_str("</div>");
                }
                CardSection::Tags(badges) => {
                    html.push_str("<div class=\"mb-3\">");
                    for badge in badges {
                        html.push_str(&format!(
                            "<span class=\"badge {}\">{}</span> ",
                            badge.emphasis.css_class(),
                            encode_text(&badge.text)
                        ));
                    }
                    html.push_str("</div>");
                }
                CardSection::Detail(block) => {
                    if !details_open {
                        html.push_str("<ul class=\"ps-0\">");
                        details_open = true;
                    }
                    html.push_str("<div class=\"list-group-item pb-1\">");
                    html.push_str(&format!(
                        "<span class=\"fw-bold\">{}: </span>",
                        block.kind.label()
                    ));
                    for paragraph in &block.paragraphs {
                        html.push_str("<p>");
                        html.push_str(&encode_text(paragraph));
                        html.push_str("</p>");
                    }
                    html.push_str("</div>");
                }
            }
        }

        if details_open {
            html.push_str("</ul>");
        }
        html.push_str("</div>");
        html
    }

    /// Renders the card as plain text wrapped to `width` columns.
    ///
    /// Descriptive tags are shown as `[tag]`, social media tags as `<tag>`.
    pub fn to_plain_text(&self, width: usize) -> String {
        let width = width.max(20);
        let mut lines: Vec<String> = Vec::new();

        for section in self.sections() {
            match section {
                CardSection::Title(title) => {
                    lines.push(title.to_string());
                    lines.push("=".repeat(title.chars().count().min(width)));
                }
                CardSection::Tags(badges) => {
                    let joined = badges
                        .iter()
                        .map(|badge| match badge.emphasis {
                            BadgeEmphasis::Secondary => format!("[{}]", badge.text),
                            BadgeEmphasis::Primary => format!("<{}>", badge.text),
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    lines.extend(textwrap::wrap(&joined, width).into_iter().map(String::from));
                    lines.push(String::new());
                }
                CardSection::Detail(block) => {
                    lines.push(format!("{}:", block.kind.label()));
                    for paragraph in &block.paragraphs {
                        if paragraph.is_empty() {
                            lines.push(String::new());
                            continue;
                        }
                        let options = textwrap::Options::new(width)
                            .initial_indent("  ")
                            .subsequent_indent("  ");
                        lines.extend(
                            textwrap::wrap(paragraph, options)
                                .into_iter()
                                .map(String::from),
                        );
                    }
                }
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, project};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_html_escapes_content() {
        let card = project(&parse("title: Cats & <Dogs>\n").expect("parses"));
        assert_eq!(
            card.to_html(),
            "<div class=\"card\"><div class=\"card-header bg-dark fw-bold fs-3\">Cats &amp; &lt;Dogs&gt;</div></div>"
        );
    }

    #[test]
    fn test_html_badges_and_details() {
        let card = project(
            &parse("descriptive_tags:\n  - fog\nsocial_media_tags:\n  - MistyMystery\nlocation: Vik\n")
                .expect("parses"),
        );
        let html = card.to_html();

        assert!(html.contains("<span class=\"badge bg-secondary\">fog</span>"));
        assert!(html.contains("<span class=\"badge bg-primary\">MistyMystery</span>"));
        assert!(html.contains("<span class=\"fw-bold\">Location: </span><p>Vik</p>"));
        assert!(html.contains("<ul class=\"ps-0\">"));
    }

    #[test]
    fn test_empty_card_html() {
        assert_eq!(
            crate::CardViewModel::empty().to_html(),
            "<div class=\"card\"></div>"
        );
    }

    #[test]
    fn test_plain_text_layout() {
        let card = project(
            &parse("title: Cat\ndescriptive_tags:\n  - a\nsocial_media_tags:\n  - b\nprocess: Digital\n")
                .expect("parses"),
        );
        assert_eq!(
            card.to_plain_text(80),
            "Cat\n===\n[a] <b>\n\nProcess:\n  Digital"
        );
    }
}
