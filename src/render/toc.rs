//! doctoc tables of contents.
//!
//! The course sources carry a table of contents between doctoc markers so
//! they read well on GitHub. [`update_toc`] regenerates it: headings down to
//! level 3, no title, GitHub anchors. A document without markers gets one
//! at the top.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use super::markdown::{slugify, unique};
use super::remark::{DOCTOC_END, DOCTOC_START, doctoc_blocks, top_level_headings};

/// Deepest heading level listed.
const TOC_DEPTH: usize = 3;

const MARKER_TAIL: &str = " generated TOC please keep comment here to allow auto update -->";
const DONT_EDIT: &str = "<!-- DON'T EDIT THIS SECTION, INSTEAD RE-RUN doctoc TO UPDATE -->";

/// The document with a fresh table of contents, or `None` if it is already
/// up to date or has nothing to list.
///
/// With an existing table only the headings below it are listed.
pub fn update_toc(markdown: &str) -> Option<String> {
    let existing = doctoc_blocks(markdown).into_iter().next();
    if existing.is_none() && markdown.contains(DOCTOC_START) {
        // Unterminated block, already reported.
        return None;
    }
    let listed_from = existing.as_ref().map_or(0, |block| block.end);

    // Anchors are numbered over every heading, like GitHub does.
    let mut seen = FxHashMap::default();
    let entries: Vec<(usize, String, String)> = top_level_headings(markdown)
        .into_iter()
        .filter_map(|heading| {
            let anchor = unique(&mut seen, slugify(&heading.text));
            (heading.line_start >= listed_from && heading.level <= TOC_DEPTH)
                .then_some((heading.level, heading.text, anchor))
        })
        .collect();

    if entries.is_empty() && existing.is_none() {
        return None;
    }

    let block = toc_block(&entries);
    let updated = match existing {
        Some(range) => format!("{}{block}{}", &markdown[..range.start], &markdown[range.end..]),
        None => format!("{block}\n{markdown}"),
    };
    (updated != markdown).then_some(updated)
}

fn toc_block(entries: &[(usize, String, String)]) -> String {
    let top = entries.iter().map(|(level, ..)| *level).min().unwrap_or(1);

    let mut block = format!("{DOCTOC_START}{MARKER_TAIL}\n{DONT_EDIT}\n\n");
    for (level, text, anchor) in entries {
        let indent = "  ".repeat(level - top);
        let _ = writeln!(block, "{indent}- [{text}](#{anchor})");
    }
    let _ = writeln!(block, "\n{DOCTOC_END}{MARKER_TAIL}");
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::remark::{RemarkOptions, to_slides};

    #[test]
    fn test_toc_inserted_at_top() {
        let md = "# Git\n\nIntro.\n\n## Branches\n\n### Merging\n\n#### Too deep\n\n```sh\n# not a heading\n```\n";
        let updated = update_toc(md).unwrap();

        let (toc, rest) = updated.split_once("<!-- END doctoc").unwrap();
        assert!(toc.starts_with("<!-- START doctoc generated TOC"));
        assert!(toc.ends_with(
            "- [Git](#git)\n  - [Branches](#branches)\n    - [Merging](#merging)\n\n"
        ));
        assert!(!toc.contains("Too deep"));
        assert!(!toc.contains("not a heading"));
        assert!(rest.ends_with(md));
    }

    #[test]
    fn test_existing_toc_replaced_in_place() {
        let md = "# Git\n\n<!-- START doctoc generated TOC please keep comment here to allow auto update -->\n- [Old](#old)\n<!-- END doctoc generated TOC please keep comment here to allow auto update -->\n\n## Branches\n\n## Remotes\n";
        let updated = update_toc(md).unwrap();

        assert!(updated.starts_with("# Git\n\n<!-- START doctoc"));
        assert!(!updated.contains("[Old]"));
        // Only headings below the table are listed.
        assert!(!updated.contains("[Git]"));
        assert!(updated.contains("\n- [Branches](#branches)\n- [Remotes](#remotes)\n"));
        assert!(updated.ends_with("-->\n\n## Branches\n\n## Remotes\n"));
    }

    #[test]
    fn test_update_is_idempotent() {
        let once = update_toc("# A\n\n## B\n").unwrap();
        assert_eq!(update_toc(&once), None);
    }

    #[test]
    fn test_duplicate_anchors_numbered() {
        let updated = update_toc("## Usage\n\n### Example\n\n## Usage\n\n### Example\n").unwrap();
        assert!(updated.contains("- [Usage](#usage)\n  - [Example](#example)\n- [Usage](#usage-1)\n  - [Example](#example-1)\n"));
    }

    #[test]
    fn test_nothing_to_list() {
        assert_eq!(update_toc("Just text.\n"), None);
        assert_eq!(update_toc("<!-- START doctoc -->\n# A\n"), None);
    }

    #[test]
    fn test_generated_toc_dropped_from_slides() {
        let updated = update_toc("# Git\n\n## Branches\n").unwrap();
        let slides = to_slides(&updated, RemarkOptions::default());
        assert!(!slides.contains("doctoc"));
        assert!(slides.starts_with("class: center, middle\n\n# Git\n"), "{slides}");
    }
}
