//! Build pipeline.
//!
//! # Architecture
//!
//! ```text
//!              ┌── build-assets ──┐
//!              ├── build-content ─┤
//! build_all ───┼── build-index ───┼──► BuildSummary
//!              └── build-slides ──┘
//!                (scoped threads, rayon inside each step)
//! ```
//!
//! - [`target`]: which files each target selects
//! - [`process`]: per-file read → transform → write, full or incremental
//! - [`graph`]: the step runner behind the composite build
//! - [`clean`]: output tree removal

mod clean;
mod context;
mod graph;
mod output;
mod process;
mod target;

pub use clean::clean_dir;
pub use context::BuildContext;
pub use graph::StepGraph;
pub use process::{TargetReport, build_target, rebuild_paths, remove_outputs};
pub use target::{BuildTarget, Selectors};

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;

use crate::logger::ProgressLine;
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Reports of a composite build, one per target.
#[derive(Debug)]
pub struct BuildSummary {
    pub reports: Vec<TargetReport>,
}

impl BuildSummary {
    pub fn written(&self) -> usize {
        self.reports.iter().map(|r| r.written.len()).sum()
    }
}

/// Build all four targets concurrently.
///
/// A failing target does not stop the others; the error lists every step
/// that failed once all of them are done.
pub fn build_all(ctx: &BuildContext, quiet: bool) -> Result<BuildSummary> {
    let config = &ctx.config;
    if config.build.clean
        && clean_dir(&config.build.output)
            .with_context(|| format!("failed to clean {}", config.build.output.display()))?
    {
        debug!("build"; "removed {}", ctx.display(&config.build.output));
    }

    let files: Vec<(BuildTarget, Vec<PathBuf>)> = BuildTarget::ALL
        .into_iter()
        .map(|target| (target, ctx.selectors.get(target).collect()))
        .collect();

    let progress = (!quiet).then(|| {
        let counts: Vec<_> = files.iter().map(|(t, f)| (t.name(), f.len())).collect();
        ProgressLine::new(&counts)
    });
    let reports = Mutex::new(Vec::with_capacity(files.len()));

    let mut graph = StepGraph::new();
    for (target, paths) in &files {
        let reports = &reports;
        let progress = progress.as_ref();
        graph = graph.step(target.step_name(), &[], move || {
            let report = process::process_files(ctx, *target, paths, progress);
            let result = report.to_result();
            reports.lock().push(report);
            result
        });
    }
    let outcome = graph.run()?;

    if let Some(progress) = progress {
        progress.finish();
    }

    let mut reports = reports.into_inner();
    reports.sort_by_key(|r| r.target);
    for report in &reports {
        report.log_failures(ctx);
    }

    if !outcome.is_success() {
        bail!("build failed: {}", outcome.unsuccessful().join(", "));
    }

    let summary = BuildSummary { reports };
    if !quiet {
        log!("build"; "done, {} written", plural_count(summary.written(), "file"));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{test_config, test_site};
    use std::fs;

    #[test]
    fn test_build_readme_and_named_doc() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        fs::write(dir.path().join("subjects/js/INSTALL.md"), "# Install\n").unwrap();
        let ctx = BuildContext::new(test_config(dir.path())).unwrap();

        build_all(&ctx, true).unwrap();

        let out = &ctx.config.build.output;
        let mut decks: Vec<_> = ctx
            .selectors
            .get(BuildTarget::Slides)
            .collect()
            .iter()
            .map(|p| process::output_path(&ctx, BuildTarget::Slides, p).unwrap())
            .collect();
        decks.sort();
        assert_eq!(
            decks,
            [
                out.join("subjects/js/index.html"),
                out.join("subjects/js/install/index.html")
            ]
        );

        let readme = fs::read_to_string(out.join("subjects/js/index.html")).unwrap();
        let install = fs::read_to_string(out.join("subjects/js/install/index.html")).unwrap();
        assert!(readme.contains(r#"var base = "../..";"#));
        assert!(install.contains(r#"var base = "../../..";"#));
        assert!(out.join("index.html").is_file());

        // Nothing but the two decks and the index page.
        let written = jwalk::WalkDir::new(out)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .count();
        assert_eq!(written, 3);
    }

    #[test]
    fn test_failing_target_reported_others_finish() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/style.css"), "body {}").unwrap();
        let ctx = BuildContext::new(test_config(dir.path())).unwrap();
        fs::remove_file(&ctx.config.build.readme).unwrap();

        let err = build_all(&ctx, true).unwrap_err();
        assert_eq!(err.to_string(), "build failed: build-index");
        assert!(ctx.config.assets_output_dir().join("style.css").is_file());
        assert!(ctx.config.content_output_dir().join("js/index.html").is_file());
    }

    #[test]
    fn test_clean_build_removes_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        let mut config = test_config(dir.path());
        let stale = config.build.output.join("stale.html");
        fs::create_dir_all(&config.build.output).unwrap();
        fs::write(&stale, "old").unwrap();

        config.build.clean = true;
        let ctx = BuildContext::new(config).unwrap();
        build_all(&ctx, true).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_rebuild_touches_only_changed_output() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        fs::write(dir.path().join("subjects/js/INSTALL.md"), "# Install\n").unwrap();
        let ctx = BuildContext::new(test_config(dir.path())).unwrap();
        build_all(&ctx, true).unwrap();

        let out = ctx.config.content_output_dir();
        let readme_out = out.join("js/index.html");
        let before = fs::read(&readme_out).unwrap();
        let before_mtime = fs::metadata(&readme_out).unwrap().modified().unwrap();
        let index_before = fs::read(ctx.config.build.output.join("index.html")).unwrap();

        let install = ctx.config.build.content.join("js/INSTALL.md");
        fs::write(&install, "# Installing Node\n").unwrap();
        let report = rebuild_paths(&ctx, BuildTarget::Slides, &[install]);

        assert_eq!(report.written, [out.join("js/install/index.html")]);
        assert!(
            fs::read_to_string(out.join("js/install/index.html"))
                .unwrap()
                .contains("Installing Node (Course)")
        );
        assert_eq!(fs::read(&readme_out).unwrap(), before);
        assert_eq!(
            fs::metadata(&readme_out).unwrap().modified().unwrap(),
            before_mtime
        );
        assert_eq!(
            fs::read(ctx.config.build.output.join("index.html")).unwrap(),
            index_before
        );
    }
}
