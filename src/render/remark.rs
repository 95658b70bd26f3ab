//! Markdown to remark.js slide markup.
//!
//! Course documents are plain Markdown. To present them, each heading of
//! level 1 to 3 opens a new slide:
//!
//! ```text
//! # Git                      class: center, middle
//!                            # Git
//! Intro.
//!                            Intro.
//! ## Branches         →
//!                            ---
//! Text.
//!                            .breadcrumbs[Git]
//!                            ## Branches
//!
//!                            Text.
//! ```
//!
//! doctoc tables of contents are dropped, they make no sense on a slide.
//! Headings are located by the Markdown parser, so only real top-level
//! headings open slides: not `#` lines in code blocks, not headings quoted
//! or nested in lists, and not a `---` underlining a setext heading.

use std::fmt::Write as _;
use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::log;

pub(super) const DOCTOC_START: &str = "<!-- START doctoc";
pub(super) const DOCTOC_END: &str = "<!-- END doctoc";

/// Deepest heading level that still opens a slide.
const SLIDE_LEVEL: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct RemarkOptions {
    /// Prefix level 2 and 3 slides with their ancestor headings.
    pub breadcrumbs: bool,
}

/// A heading outside any container block.
#[derive(Debug, PartialEq)]
pub(super) struct Heading {
    pub(super) level: usize,
    pub(super) text: String,
    /// Offset of the first line of the heading.
    pub(super) line_start: usize,
    /// The block right before it is a thematic break.
    after_rule: bool,
}

pub fn to_slides(markdown: &str, options: RemarkOptions) -> String {
    let markdown = strip_doctoc(markdown);
    let mut out = String::with_capacity(markdown.len() + markdown.len() / 4);
    let mut trail: Vec<(usize, String)> = Vec::new();
    let mut cursor = 0;

    for heading in top_level_headings(&markdown) {
        out.push_str(&markdown[cursor..heading.line_start]);
        cursor = heading.line_start;

        while trail.last().is_some_and(|(l, _)| *l >= heading.level) {
            trail.pop();
        }

        if heading.level <= SLIDE_LEVEL {
            if out.trim().is_empty() {
                out.clear();
            } else if !heading.after_rule {
                while out.ends_with("\n\n") {
                    out.pop();
                }
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("\n---\n\n");
            }

            if heading.level == 1 {
                out.push_str("class: center, middle\n\n");
            } else if options.breadcrumbs && !trail.is_empty() {
                let crumbs: Vec<&str> = trail.iter().map(|(_, t)| t.as_str()).collect();
                let _ = writeln!(out, ".breadcrumbs[{}]\n", crumbs.join(" > "));
            }
        }

        trail.push((heading.level, heading.text));
    }

    out.push_str(&markdown[cursor..]);
    out
}

fn parser(markdown: &str) -> Parser<'_> {
    Parser::new_ext(
        markdown,
        Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH,
    )
}

/// Headings that are not inside a block quote, list or footnote.
pub(super) fn top_level_headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut open: Vec<bool> = Vec::new();
    let mut containers = 0usize;
    let mut after_rule = false;
    let mut current: Option<Heading> = None;

    for (event, range) in parser(markdown).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if containers == 0 {
                    if let Tag::Heading { level, .. } = tag {
                        current = Some(Heading {
                            level: level as usize,
                            text: String::new(),
                            line_start: line_start(markdown, range.start),
                            after_rule,
                        });
                    }
                    after_rule = false;
                }
                let container = matches!(
                    tag,
                    Tag::BlockQuote(..) | Tag::List(_) | Tag::Item | Tag::FootnoteDefinition(_)
                );
                containers += usize::from(container);
                open.push(container);
            }
            Event::End(end) => {
                if open.pop() == Some(true) {
                    containers -= 1;
                }
                if matches!(end, TagEnd::Heading(_)) {
                    if let Some(heading) = current.take() {
                        headings.push(heading);
                    }
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = &mut current {
                    heading.text.push_str(&text);
                }
            }
            Event::Rule if containers == 0 => after_rule = true,
            _ => {}
        }
    }

    for heading in &mut headings {
        heading.text = heading.text.trim().to_string();
    }
    headings
}

/// Drop every doctoc block. A block whose end marker is missing is kept
/// whole, together with everything after it.
fn strip_doctoc(markdown: &str) -> std::borrow::Cow<'_, str> {
    let blocks = doctoc_blocks(markdown);
    if blocks.is_empty() {
        return markdown.into();
    }
    let mut out = String::with_capacity(markdown.len());
    let mut cursor = 0;
    for block in blocks {
        out.push_str(&markdown[cursor..block.start]);
        cursor = block.end;
    }
    out.push_str(&markdown[cursor..]);
    out.into()
}

pub(super) fn doctoc_blocks(markdown: &str) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut start = None;

    for (event, range) in parser(markdown).into_offset_iter() {
        let Event::Html(html) = event else {
            continue;
        };
        let html = html.trim_start();
        if html.starts_with(DOCTOC_START) && start.is_none() {
            start = Some(line_start(markdown, range.start));
        } else if html.starts_with(DOCTOC_END) {
            if let Some(from) = start.take() {
                blocks.push(from..line_end(markdown, range.start));
            }
        }
    }

    if start.is_some() {
        log!("slides"; "doctoc block without `{}` marker, left in place", DOCTOC_END);
    }
    blocks
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRUMBS: RemarkOptions = RemarkOptions { breadcrumbs: true };
    const PLAIN: RemarkOptions = RemarkOptions { breadcrumbs: false };

    #[test]
    fn test_headings_open_slides() {
        let md = "# Git\n\nIntro.\n\n## Branches\n\nText.\n\n### Merging\n\nMore.\n";
        assert_eq!(
            to_slides(md, PLAIN),
            "class: center, middle\n\n# Git\n\nIntro.\n\n---\n\n## Branches\n\nText.\n\n---\n\n### Merging\n\nMore.\n"
        );
    }

    #[test]
    fn test_breadcrumbs() {
        let md = "# Git\n\n## Branches\n\n### Merging\n\n## Remotes\n\n# Next\n\n## Part\n";
        let out = to_slides(md, CRUMBS);
        assert!(out.contains(".breadcrumbs[Git]\n\n## Branches\n"), "{out}");
        assert!(out.contains(".breadcrumbs[Git > Branches]\n\n### Merging\n"), "{out}");
        assert!(out.contains(".breadcrumbs[Git]\n\n## Remotes\n"), "{out}");
        assert!(out.contains("---\n\nclass: center, middle\n\n# Next\n"), "{out}");
        assert!(out.contains(".breadcrumbs[Next]\n\n## Part\n"), "{out}");
        assert_eq!(out.matches("---").count(), 5);
    }

    #[test]
    fn test_top_level_h2_has_no_breadcrumbs() {
        assert_eq!(to_slides("## Alone\n", CRUMBS), "## Alone\n");
    }

    #[test]
    fn test_deep_headings_stay_on_slide() {
        let md = "## Slide\n\n#### Detail\n\ntext\n";
        assert_eq!(to_slides(md, CRUMBS), md);
    }

    #[test]
    fn test_headings_in_code_blocks_ignored() {
        let md = "# Shell\n\n```bash\n# list files\nls\n```\n\n~~~\n## not a slide\n~~~\n";
        let out = to_slides(md, PLAIN);
        assert!(!out.contains("---"), "{out}");
        assert!(out.contains("# list files\n"));
    }

    #[test]
    fn test_doctoc_removed() {
        let md = "# Git\n\n<!-- START doctoc generated TOC please keep comment here to allow auto update -->\n<!-- DON'T EDIT THIS SECTION, INSTEAD RE-RUN doctoc TO UPDATE -->\n\n- [Branches](#branches)\n\n<!-- END doctoc generated TOC please keep comment here to allow auto update -->\n\n## Branches\n";
        let out = to_slides(md, PLAIN);
        assert!(!out.contains("doctoc"));
        assert!(!out.contains("(#branches)"));
        assert!(out.ends_with("---\n\n## Branches\n"), "{out}");
    }

    #[test]
    fn test_existing_separator_not_doubled() {
        let md = "Intro\n\n---\n\n## Next\n";
        assert_eq!(to_slides(md, PLAIN), md);
    }

    #[test]
    fn test_leading_blank_lines_dropped_before_first_slide() {
        assert_eq!(to_slides("\n\n# Title\n", PLAIN), "class: center, middle\n\n# Title\n");
    }

    #[test]
    fn test_setext_headings() {
        let md = "Git\n===\n\nIntro.\n\nBranches\n--------\n\nText.\n";
        assert_eq!(
            to_slides(md, CRUMBS),
            "class: center, middle\n\nGit\n===\n\nIntro.\n\n---\n\n.breadcrumbs[Git]\n\nBranches\n--------\n\nText.\n"
        );
    }

    #[test]
    fn test_setext_underline_is_not_a_separator() {
        let md = "## One\n\nText\n\nTwo\n---\n";
        let out = to_slides(md, PLAIN);
        assert_eq!(out, "## One\n\nText\n\n---\n\nTwo\n---\n");
    }

    #[test]
    fn test_nested_headings_stay_on_slide() {
        let md = "# Quotes\n\n> ## Quoted\n\n- item\n\n  ```\n  ## in a list fence\n  ```\n\n<div>\n\n## In html\n\n</div>\n";
        let out = to_slides(md, PLAIN);
        assert_eq!(out.matches("\n---\n").count(), 1, "{out}");
        assert!(out.contains("> ## Quoted\n"));
        assert!(out.contains("  ## in a list fence\n"));
        assert!(out.contains("---\n\n## In html\n"), "{out}");
    }

    #[test]
    fn test_unterminated_doctoc_kept() {
        let md = "# Git\n\n<!-- START doctoc -->\n- [Branches](#branches)\n\n## Branches\n\nText.\n";
        let out = to_slides(md, PLAIN);
        assert!(out.contains("<!-- START doctoc -->"));
        assert!(out.contains("- [Branches](#branches)"));
        assert!(out.ends_with("---\n\n## Branches\n\nText.\n"), "{out}");
    }

    #[test]
    fn test_doctoc_markers_in_code_kept() {
        let md = "# Docs\n\n```html\n<!-- START doctoc -->\n<!-- END doctoc -->\n```\n";
        assert!(to_slides(md, PLAIN).contains("<!-- START doctoc -->\n<!-- END doctoc -->"));
    }

    #[test]
    fn test_heading_text_and_levels() {
        let headings = top_level_headings("## Part ##\n\n### `git` basics\n\n    # code\n\n#hashtag\n");
        let found: Vec<_> = headings.iter().map(|h| (h.level, h.text.as_str())).collect();
        assert_eq!(found, [(2, "Part"), (3, "git basics")]);
    }
}
