//! Destination planning for slide decks.
//!
//! ```text
//! <content>/README.md          → index.html               depth 0
//! <content>/intro.md           → intro/index.html         depth 1
//! <content>/js/README.md       → js/index.html            depth 1
//! <content>/js/INSTALL.md      → js/install/index.html    depth 2
//! ```

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::SourceKind;
use crate::utils::path::clean;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("`{path}` is not inside the content directory `{root}`")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("`{0}` is not a Markdown file")]
    NotMarkdown(PathBuf),
}

/// Where one Markdown document is rendered, relative to the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidePlan {
    pub source: PathBuf,
    /// Always ends in `index.html`.
    pub dest: PathBuf,
    /// Directory levels between the content root and `dest`'s directory.
    pub depth: usize,
    pub kind: SourceKind,
}

impl SlidePlan {
    /// Relative path from the deck back to the build root.
    pub fn base_path(&self) -> String {
        base_path(self.depth)
    }
}

/// `"../"` repeated `depth + 1` times without the trailing `/`.
///
/// The extra level climbs out of the mirrored content directory.
pub fn base_path(depth: usize) -> String {
    let mut path = "../".repeat(depth + 1);
    path.pop();
    path
}

/// Plan the destination of a Markdown document.
///
/// Both paths are compared lexically; a relative path on one side only is
/// resolved against the current directory first.
pub fn plan_slide(content_root: &Path, source: &Path) -> Result<SlidePlan, PlanError> {
    let (root, path) = match (content_root.is_absolute(), source.is_absolute()) {
        (true, false) => (clean(content_root), absolutize(source)),
        (false, true) => (absolutize(content_root), clean(source)),
        _ => (clean(content_root), clean(source)),
    };

    let outside = || PlanError::OutsideRoot {
        path: source.to_path_buf(),
        root: content_root.to_path_buf(),
    };

    let rel = path.strip_prefix(&root).map_err(|_| outside())?;
    if rel.as_os_str().is_empty() || rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(outside());
    }

    if rel.extension().is_none_or(|ext| ext != "md") {
        return Err(PlanError::NotMarkdown(source.to_path_buf()));
    }

    let dir = rel.parent().unwrap_or(Path::new(""));
    let kind = SourceKind::of_markdown(rel);
    let dest_dir = match kind {
        SourceKind::NamedDoc => {
            let stem = rel
                .file_stem()
                .map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            dir.join(stem)
        }
        _ => dir.to_path_buf(),
    };

    Ok(SlidePlan {
        source: rel.to_path_buf(),
        dest: dest_dir.join("index.html"),
        depth: depth_of(&dest_dir),
        kind,
    })
}

/// Count parent steps from `dir` up to the (empty) content root.
fn depth_of(dir: &Path) -> usize {
    let mut depth = 0;
    let mut current = dir;
    while let Some(parent) = current.parent() {
        depth += 1;
        current = parent;
    }
    depth
}

fn absolutize(path: &Path) -> PathBuf {
    std::env::current_dir().map_or_else(|_| clean(path), |cwd| clean(&cwd.join(path)))
}
