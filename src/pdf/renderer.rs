//! Printing one deck with a headless browser.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use url::Url;

use super::PdfError;
use crate::utils::exec::{Cmd, FilterRule};

/// Something that turns an HTML file into a PDF at `dest`.
///
/// Implementations must not leave a partial file at `dest` on failure.
pub trait PdfRenderer: Sync {
    fn render(&self, source: &Path, dest: &Path) -> Result<(), PdfError>;
}

/// Chromium-family browser noise on stderr.
const CHROME_FILTER: FilterRule = FilterRule::new(&["[", "DevTools listening", "Fontconfig"]);

/// Prints with `--headless --print-to-pdf`.
pub struct ChromeRenderer {
    browser: PathBuf,
}

impl ChromeRenderer {
    pub const fn new(browser: PathBuf) -> Self {
        Self { browser }
    }

    fn print(&self, source: &Path, tmp: &Path) -> Result<(), PdfError> {
        let url = Url::from_file_path(source).map_err(|()| PdfError::Url(source.to_path_buf()))?;
        let mut print_to = std::ffi::OsString::from("--print-to-pdf=");
        print_to.push(tmp);

        Cmd::new(&self.browser)
            .args(["--headless", "--disable-gpu", "--no-pdf-header-footer"])
            .arg(print_to)
            .arg(url.as_str())
            .filter(&CHROME_FILTER)
            .run()
            .map_err(|e| PdfError::Browser(format!("{e:#}")))?;

        check_pdf(tmp)
    }
}

impl PdfRenderer for ChromeRenderer {
    fn render(&self, source: &Path, dest: &Path) -> Result<(), PdfError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PdfError::Io(parent.to_path_buf(), e))?;
        }

        let tmp = partial_path(dest);
        let result = self
            .print(source, &tmp)
            .and_then(|()| fs::rename(&tmp, dest).map_err(|e| PdfError::Io(dest.to_path_buf(), e)));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

/// `deck.pdf` → `deck.pdf.part`
fn partial_path(dest: &Path) -> PathBuf {
    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".part");
    tmp.into()
}

/// The browser exits 0 even when printing failed, so look at the file.
fn check_pdf(path: &Path) -> Result<(), PdfError> {
    let mut magic = [0u8; 4];
    let read = fs::File::open(path)
        .and_then(|mut file| file.read(&mut magic))
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfError::Empty,
            _ => PdfError::Io(path.to_path_buf(), e),
        })?;

    match read {
        0 => Err(PdfError::Empty),
        _ if &magic[..read] == b"%PDF" => Ok(()),
        _ => Err(PdfError::NotPdf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/pdf/js.pdf")),
            PathBuf::from("/pdf/js.pdf.part")
        );
    }

    #[test]
    fn test_check_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out.pdf");

        assert!(matches!(check_pdf(&file), Err(PdfError::Empty)));
        fs::write(&file, "").unwrap();
        assert!(matches!(check_pdf(&file), Err(PdfError::Empty)));
        fs::write(&file, "<html>").unwrap();
        assert!(matches!(check_pdf(&file), Err(PdfError::NotPdf)));
        fs::write(&file, "%PDF-1.4\n").unwrap();
        assert!(check_pdf(&file).is_ok());
    }

    #[test]
    fn test_failed_browser_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("index.html");
        fs::write(&source, "<html></html>").unwrap();
        let dest = dir.path().join("pdf/js.pdf");

        let renderer = ChromeRenderer::new(dir.path().join("no-such-browser"));
        let err = renderer.render(&source, &dest).unwrap_err();
        assert!(matches!(err, PdfError::Browser(_)));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
