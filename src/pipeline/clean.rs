//! Removing output trees.

use std::fs;
use std::io;
use std::path::Path;

/// Remove `dir` and everything below it. A missing directory is not an
/// error; returns whether anything was removed.
pub fn clean_dir(dir: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_existing_tree() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("build");
        fs::create_dir_all(out.join("subjects/js")).unwrap();
        fs::write(out.join("subjects/js/index.html"), "x").unwrap();

        assert!(clean_dir(&out).unwrap());
        assert!(!out.exists());
    }

    #[test]
    fn test_clean_missing_tree_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!clean_dir(&dir.path().join("never-built")).unwrap());
        assert!(!clean_dir(&dir.path().join("never-built")).unwrap());
    }
}
