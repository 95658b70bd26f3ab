//! Running a batch of PDF jobs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::{PdfError, PdfJob, PdfRenderer};
use crate::logger::ProgressLine;

/// A deck that could not be printed.
#[derive(Debug)]
pub struct PdfFailure {
    pub source: PathBuf,
    pub error: PdfError,
}

#[derive(Debug, Default)]
pub struct PdfReport {
    /// Written PDF files, in job order.
    pub written: Vec<PathBuf>,
    pub failures: Vec<PdfFailure>,
}

impl PdfReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Print every job on a pool of `concurrency` threads.
///
/// Every job runs regardless of earlier failures.
pub fn export_all<R: PdfRenderer>(
    jobs: &[PdfJob],
    renderer: &R,
    concurrency: usize,
    progress: Option<&ProgressLine>,
) -> Result<PdfReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()
        .context("failed to create PDF worker pool")?;

    let results: Vec<_> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let result = renderer.render(&job.source, &job.dest);
                if let Some(progress) = progress {
                    progress.inc("pdf");
                }
                (job, result)
            })
            .collect()
    });

    let mut report = PdfReport::default();
    for (job, result) in results {
        match result {
            Ok(()) => report.written.push(job.dest.clone()),
            Err(error) => report.failures.push(PdfFailure {
                source: job.source.clone(),
                error,
            }),
        }
    }
    Ok(report)
}
