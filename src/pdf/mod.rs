//! PDF export of built slide decks.
//!
//! ```text
//! staged slide tree ─► discover_jobs ─► export_all ─► PdfReport
//!                                        (rayon, one browser per job)
//! ```

mod export;
mod job;
mod renderer;

pub use export::{PdfReport, export_all};
pub use job::{PdfJob, discover_jobs};
pub use renderer::{ChromeRenderer, PdfRenderer};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why one deck could not be printed.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("cannot turn `{0}` into a file URL")]
    Url(PathBuf),

    #[error("browser failed: {0}")]
    Browser(String),

    #[error("browser wrote no output")]
    Empty,

    #[error("browser output is not a PDF")]
    NotPdf,

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] io::Error),
}
