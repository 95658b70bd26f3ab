//! Path normalization.
//!
//! - `normalize_path`: absolute form via `canonicalize`, with fallback
//! - `resolve_path`: config-relative paths against the project root
//! - `clean`: lexical `.`/`..` folding that never touches the filesystem

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first, falls back to joining with the current
/// directory for paths that do not exist yet.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            clean(path)
        } else {
            std::env::current_dir()
                .map_or_else(|_| clean(path), |cwd| clean(&cwd.join(path)))
        }
    })
}

/// Resolve `path` against `root` unless it is already absolute.
#[inline]
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&root.join(path))
    }
}

/// Fold `.` and `..` components lexically.
///
/// A `..` that would climb above the start of a relative path is kept, so
/// callers can still detect escapes.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Render a relative path with `/` separators on every platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
