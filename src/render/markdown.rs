//! Markdown to HTML for the course index page.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use rustc_hash::FxHashMap;

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// The extensions a GitHub README relies on.
    pub const fn github() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: false,
        }
    }

    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Render Markdown to an HTML fragment. Headings without an explicit id get
/// a GitHub-style one, so `#section` links copied from GitHub keep working.
pub fn to_html(markdown: &str, options: &MarkdownOptions) -> String {
    let mut events: Vec<Event<'_>> =
        Parser::new_ext(markdown, options.to_pulldown_options()).collect();
    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let slug = slugify(&heading_text(&events[i + 1..]));
        if slug.is_empty() {
            continue;
        }
        let slug = unique(&mut seen, slug);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

/// Plain text of a heading, up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// GitHub anchor: lowercase, spaces become `-`, punctuation other than `-`
/// and `_` is dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            slug.push('-');
        }
    }
    slug
}

/// Repeated anchors get `-1`, `-2`, ... like GitHub.
pub(super) fn unique(seen: &mut FxHashMap<String, usize>, slug: String) -> String {
    let count = seen.entry(slug.clone()).or_insert(0);
    let id = if *count == 0 {
        slug
    } else {
        format!("{slug}-{count}")
    };
    *count += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> String {
        to_html(md, &MarkdownOptions::github())
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's new in ES2015?"), "whats-new-in-es2015");
        assert_eq!(slugify("snake_case & kebab-case"), "snake_case--kebab-case");
        assert_eq!(slugify("Réseau"), "réseau");
    }

    #[test]
    fn test_heading_ids() {
        let html = render("# Course\n\n## Getting `git` Started\n");
        assert!(html.contains(r#"<h1 id="course">Course</h1>"#), "{html}");
        assert!(
            html.contains(r#"<h2 id="getting-git-started">Getting <code>git</code> Started</h2>"#),
            "{html}"
        );
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let html = render("## Exercises\n\n## Exercises\n\n## Exercises\n");
        assert!(html.contains(r#"id="exercises""#));
        assert!(html.contains(r#"id="exercises-1""#));
        assert!(html.contains(r#"id="exercises-2""#));
    }

    #[test]
    fn test_github_extensions() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n\n~~old~~\n");
        assert!(html.contains("<table>"));
        assert!(html.contains(r#"type="checkbox""#));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_links_untouched() {
        let html = render("* [JavaScript](subjects/js/)\n");
        assert!(html.contains(r#"<a href="subjects/js/">JavaScript</a>"#));
    }
}
