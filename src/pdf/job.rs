//! Mapping built decks to PDF files.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

/// One deck to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfJob {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Every deck under `slide_root`, sorted by source path.
///
/// A deck is an `index.html` at least one directory below the root; its PDF
/// is named after that directory: `a/b/index.html` → `<pdf_root>/a/b.pdf`.
pub fn discover_jobs(slide_root: &Path, pdf_root: &Path) -> Vec<PdfJob> {
    if !slide_root.is_dir() {
        return Vec::new();
    }

    let mut jobs: Vec<PdfJob> = WalkDir::new(slide_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
        .filter_map(|e| {
            let source = e.path();
            let dest = pdf_path(slide_root, &source, pdf_root)?;
            Some(PdfJob { source, dest })
        })
        .collect();
    jobs.sort_by(|a, b| a.source.cmp(&b.source));
    jobs
}

fn pdf_path(slide_root: &Path, source: &Path, pdf_root: &Path) -> Option<PathBuf> {
    let deck_dir = source.parent()?.strip_prefix(slide_root).ok()?;
    if deck_dir.as_os_str().is_empty() {
        return None;
    }
    let mut dest = pdf_root.join(deck_dir).into_os_string();
    dest.push(".pdf");
    Some(dest.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    #[test]
    fn test_nested_decks_mirror_their_directory() {
        let dir = tempfile::tempdir().unwrap();
        let slides = dir.path().join("tmp/pdf/subjects");
        touch(&slides, "index.html");
        touch(&slides, "js/index.html");
        touch(&slides, "js/install/index.html");
        touch(&slides, "js/images/logo.png");
        touch(&slides, "git/notes.html");

        let pdf = dir.path().join("pdf");
        let jobs = discover_jobs(&slides, &pdf);
        assert_eq!(
            jobs,
            vec![
                PdfJob {
                    source: slides.join("js/index.html"),
                    dest: pdf.join("js.pdf"),
                },
                PdfJob {
                    source: slides.join("js/install/index.html"),
                    dest: pdf.join("js/install.pdf"),
                },
            ]
        );
    }

    #[test]
    fn test_missing_slide_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_jobs(&dir.path().join("nothing"), dir.path()).is_empty());
    }

    #[test]
    fn test_dotted_directory_keeps_its_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "node.js/index.html");
        let jobs = discover_jobs(dir.path(), Path::new("/pdf"));
        assert_eq!(jobs[0].dest, PathBuf::from("/pdf/node.js.pdf"));
    }
}
