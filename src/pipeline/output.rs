//! Writing and removing build outputs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::render::RenderedPage;

/// Write a rendered page, creating its directory.
pub fn write_page(page: &RenderedPage) -> Result<()> {
    ensure_parent(&page.dest)?;
    fs::write(&page.dest, &page.bytes)
        .with_context(|| format!("failed to write {}", page.dest.display()))
}

/// Copy a file verbatim, creating the destination directory.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    ensure_parent(dest)?;
    fs::copy(source, dest).with_context(|| {
        format!("failed to copy {} to {}", source.display(), dest.display())
    })?;
    Ok(())
}

/// Remove an output file or directory, then prune directories it left
/// empty, never going above `stop`. Returns whether anything was removed.
pub fn remove_output(dest: &Path, stop: &Path) -> Result<bool> {
    let removed = if dest.is_dir() {
        fs::remove_dir_all(dest)
            .with_context(|| format!("failed to remove {}", dest.display()))?;
        true
    } else if dest.exists() {
        fs::remove_file(dest).with_context(|| format!("failed to remove {}", dest.display()))?;
        true
    } else {
        false
    };

    let mut dir = dest.parent();
    while let Some(current) = dir {
        if current == stop || !current.starts_with(stop) {
            break;
        }
        // Fails on a non-empty directory, which ends the walk.
        if fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }

    Ok(removed)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_page_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let page = RenderedPage {
            source: dir.path().join("subjects/js/INSTALL.md"),
            dest: dir.path().join("build/subjects/js/install/index.html"),
            bytes: b"<html></html>".to_vec(),
        };
        write_page(&page).unwrap();
        assert_eq!(fs::read(&page.dest).unwrap(), page.bytes);
    }

    #[test]
    fn test_remove_output_prunes_empty_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("build");
        let deck = out.join("subjects/js/install/index.html");
        let sibling = out.join("subjects/js/index.html");
        fs::create_dir_all(deck.parent().unwrap()).unwrap();
        fs::write(&deck, "a").unwrap();
        fs::write(&sibling, "b").unwrap();

        assert!(remove_output(&deck, &out).unwrap());
        assert!(!deck.parent().unwrap().exists());
        assert!(sibling.exists());

        assert!(remove_output(&sibling, &out).unwrap());
        assert!(!out.join("subjects").exists());
        assert!(out.exists());

        assert!(!remove_output(&sibling, &out).unwrap());
    }
}
