//! Logical kind of a source file.

use std::path::Path;

/// What a source file becomes in the build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `README.md` inside the content tree: its directory's deck.
    Readme,
    /// Any other Markdown file inside the content tree: a deck one level down.
    NamedDoc,
    /// The repository's main readme: the top-level `index.html`.
    Index,
    /// Copied verbatim.
    Asset,
}

impl SourceKind {
    /// Kind of a Markdown file inside the content tree (case-sensitive stem).
    pub fn of_markdown(path: &Path) -> Self {
        if path.file_stem().is_some_and(|stem| stem == "README") {
            Self::Readme
        } else {
            Self::NamedDoc
        }
    }

    /// Whether the document moves one directory deeper than its source.
    #[inline]
    pub const fn moves_down(self) -> bool {
        matches!(self, Self::NamedDoc)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Readme => "readme",
            Self::NamedDoc => "document",
            Self::Index => "index",
            Self::Asset => "asset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_markdown_case_sensitive() {
        assert_eq!(SourceKind::of_markdown(Path::new("js/README.md")), SourceKind::Readme);
        assert_eq!(SourceKind::of_markdown(Path::new("js/Readme.md")), SourceKind::NamedDoc);
        assert_eq!(SourceKind::of_markdown(Path::new("js/INSTALL.md")), SourceKind::NamedDoc);
    }

    #[test]
    fn test_moves_down() {
        assert!(SourceKind::NamedDoc.moves_down());
        assert!(!SourceKind::Readme.moves_down());
        assert!(!SourceKind::Index.moves_down());
    }
}
