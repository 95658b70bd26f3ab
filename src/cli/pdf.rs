//! `pdf` command: build into the staging tree and print every deck.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use crate::config::SiteConfig;
use crate::logger::ProgressLine;
use crate::pdf::{ChromeRenderer, PdfRenderer, PdfReport, discover_jobs, export_all};
use crate::pipeline::{BuildContext, BuildSummary, build_all, clean_dir};
use crate::utils::plural::plural_count;
use crate::{debug, log};

pub fn export_pdfs(config: &SiteConfig) -> Result<()> {
    let browser = config
        .pdf
        .resolve_browser()
        .ok_or_else(|| anyhow!("browser `{}` not found", config.pdf.browser))?;
    debug!("pdf"; "using {}", browser.display());

    export_with(config, &ChromeRenderer::new(browser))
}

/// Removes the staging tree when the export ends, successful or not.
struct StagingGuard<'a>(&'a Path);

impl Drop for StagingGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = clean_dir(self.0) {
            log!("pdf"; "failed to remove {}: {e}", self.0.display());
        }
    }
}

fn export_with<R: PdfRenderer>(config: &SiteConfig, renderer: &R) -> Result<()> {
    for dir in [&config.pdf.staging, &config.pdf.output] {
        clean_dir(dir).with_context(|| format!("failed to remove {}", dir.display()))?;
    }
    let _staging = StagingGuard(&config.pdf.staging);

    // Decks that failed to build are already logged; print the others.
    let staged = BuildContext::new(config.for_pdf_staging())?;
    let build = build_all(&staged, false);

    let jobs = discover_jobs(&staged.config.content_output_dir(), &config.pdf.output);
    log!("pdf"; "printing {}", plural_count(jobs.len(), "deck"));

    let progress = ProgressLine::new(&[("pdf", jobs.len())]);
    let report = export_all(&jobs, renderer, config.pdf.concurrency, Some(&progress))?;
    progress.finish();

    finish(config, &report, build)
}

fn finish(config: &SiteConfig, report: &PdfReport, build: Result<BuildSummary>) -> Result<()> {
    for failure in &report.failures {
        log!(
            "error";
            "{}: {}",
            config.root_relative(&failure.source).display(),
            failure.error
        );
    }

    let mut problems = Vec::new();
    if let Err(e) = build {
        problems.push(e.to_string());
    }
    if !report.is_ok() {
        problems.push(format!(
            "{} of {} failed",
            plural_count(report.failures.len(), "deck"),
            report.failures.len() + report.written.len()
        ));
    }
    if !problems.is_empty() {
        bail!("{}", problems.join("; "));
    }

    log!(
        "pdf";
        "done, {} in {}",
        plural_count(report.written.len(), "file"),
        config.root_relative(&config.pdf.output).display()
    );
    Ok(())
}
