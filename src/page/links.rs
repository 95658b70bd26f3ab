//! Upward-relative link fix-up.
//!
//! A named document (`js/INSTALL.md`) is rendered one directory deeper than
//! its source (`js/install/index.html`), so every link that climbs out of
//! its directory needs one more `../`. Only two forms are handled:
//!
//! ```text
//! [text](../x)      →  [text](../../x)
//! [label]: ../x     →  [label]: ../../x      (at the start of a line)
//! ```
//!
//! `./x`, bare `x`, absolute URLs and anchors are left alone. This is a text
//! transform, not a Markdown parser: apply it once per render.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r"(\[[^\]]+\]\(\.\./)").unwrap()
});

static REFERENCE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r"(?m)^(\[[^\]]+\]:\s*\.\./)").unwrap()
});

/// Add one `../` to every upward-relative link target.
pub fn rewrite_relative_links(markdown: &str) -> Cow<'_, str> {
    let inline = INLINE_LINK.replace_all(markdown, "${1}../");
    let definitions = match REFERENCE_DEFINITION.replace_all(&inline, "${1}../") {
        Cow::Borrowed(_) => None,
        Cow::Owned(rewritten) => Some(rewritten),
    };
    definitions.map_or(inline, Cow::Owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_upward_link() {
        assert_eq!(rewrite_relative_links("[x](../foo)"), "[x](../../foo)");
        assert_eq!(
            rewrite_relative_links("See [the setup](../../setup/README.md#node) first."),
            "See [the setup](../../../setup/README.md#node) first."
        );
    }

    #[test]
    fn test_reference_definition() {
        let md = "Read [the guide][guide].\n\n[guide]: ../guide/README.md\n[mdn]:  ../../mdn\n";
        let out = rewrite_relative_links(md);
        assert!(out.contains("[guide]: ../../guide/README.md\n"));
        assert!(out.contains("[mdn]:  ../../../mdn\n"));
        assert!(out.starts_with("Read [the guide][guide]."));
    }

    #[test]
    fn test_indented_reference_definition_untouched() {
        let md = "  [guide]: ../guide\n";
        assert_eq!(rewrite_relative_links(md), md);
    }

    #[test]
    fn test_non_upward_links_untouched() {
        for md in [
            "[x](foo)",
            "[x](./foo)",
            "[x](#anchor)",
            "[x](https://example.com/../x)",
            "[x]: foo/bar",
            "![diagram](images/flow.png)",
        ] {
            let out = rewrite_relative_links(md);
            assert!(matches!(out, Cow::Borrowed(_)), "rewrote `{md}`");
            assert_eq!(out, md);
        }
    }

    #[test]
    fn test_image_links_follow_inline_rule() {
        assert_eq!(
            rewrite_relative_links("![logo](../images/logo.png)"),
            "![logo](../../images/logo.png)"
        );
    }

    #[test]
    fn test_applied_twice_adds_twice() {
        let once = rewrite_relative_links("[x](../foo)").into_owned();
        assert_eq!(rewrite_relative_links(&once), "[x](../../../foo)");
    }

    #[test]
    fn test_multiple_links_on_one_line() {
        assert_eq!(
            rewrite_relative_links("[a](../a) and [b](../b) and [c](c)"),
            "[a](../../a) and [b](../../b) and [c](c)"
        );
    }
}
