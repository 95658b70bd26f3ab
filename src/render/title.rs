//! Deck titles.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// Text of the first level-1 heading, ATX or setext.
///
/// Headings inside code blocks are not headings to the parser, so a
/// `# comment` in a shell snippet is never picked up.
pub fn first_heading(markdown: &str) -> Option<String> {
    let mut parser = Parser::new(markdown);

    parser.find(|event| {
        matches!(
            event,
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            })
        )
    })?;

    let mut text = String::new();
    for event in parser {
        match event {
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Title of a deck, or `fallback` when it has no level-1 heading.
pub fn deck_title(markdown: &str, fallback: &str) -> String {
    first_heading(markdown).unwrap_or_else(|| fallback.to_string())
}

/// `<title> (<site title>)`, as shown in the browser tab.
pub fn page_title(title: &str, site_title: &str) -> String {
    format!("{title} ({site_title})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_atx_heading() {
        assert_eq!(
            first_heading("# My Title\nbody...").as_deref(),
            Some("My Title")
        );
        assert_eq!(
            first_heading("intro\n\n## Sub\n\n# Real *Title* `code`\n\n# Second").as_deref(),
            Some("Real Title code")
        );
    }

    #[test]
    fn test_setext_heading() {
        assert_eq!(first_heading("Git Basics\n==========\n").as_deref(), Some("Git Basics"));
    }

    #[test]
    fn test_heading_in_code_block_ignored() {
        let md = "```bash\n# not a title\n```\n\nbody";
        assert_eq!(first_heading(md), None);
        assert_eq!(deck_title(md, "Slides"), "Slides");
    }

    #[test]
    fn test_fallback_without_h1() {
        assert_eq!(deck_title("## Only level two\n", "Slides"), "Slides");
        assert_eq!(deck_title("", "Slides"), "Slides");
        assert_eq!(deck_title("#\n", "Slides"), "Slides");
    }

    #[test]
    fn test_page_title() {
        let title = page_title(&deck_title("# My Title\nbody...", "Slides"), "Course");
        assert_eq!(title, "My Title (Course)");
        assert!(title.contains("My Title"));
    }
}
