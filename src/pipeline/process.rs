//! Per-file processing of one build target.
//!
//! Every file goes read → transform → write on its own; files of a target
//! run in parallel and a failing file never stops its siblings.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::output::{copy_file, remove_output, write_page};
use super::{BuildContext, BuildTarget};
use crate::logger::ProgressLine;
use crate::page::plan_slide;
use crate::render::{TemplateSnapshot, render_index, render_slides};
use crate::{debug, log};

/// A file that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Outcome of building, rebuilding or cleaning up one target.
#[derive(Debug)]
pub struct TargetReport {
    pub target: BuildTarget,
    /// Output files written.
    pub written: Vec<PathBuf>,
    /// Output files or directories deleted.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl TargetReport {
    const fn new(target: BuildTarget) -> Self {
        Self {
            target,
            written: Vec::new(),
            removed: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether anything in the output directory changed.
    pub fn changed(&self) -> bool {
        !self.written.is_empty() || !self.removed.is_empty()
    }

    pub fn log_failures(&self, ctx: &BuildContext) {
        for failure in &self.failures {
            log!("error"; "{}: {:#}", ctx.display(&failure.path), failure.error);
        }
    }

    /// `Err` naming the count of failed files, after all were attempted.
    pub fn to_result(&self) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        let attempted = self.written.len() + self.failures.len();
        Err(anyhow!(
            "{}: {} of {} files failed",
            self.target.name(),
            self.failures.len(),
            attempted
        ))
    }
}

/// Template snapshots used for one whole batch.
struct Snapshots {
    index: Arc<TemplateSnapshot>,
    slides: Arc<TemplateSnapshot>,
}

impl Snapshots {
    fn take(ctx: &BuildContext) -> Self {
        Self {
            index: ctx.templates.index.snapshot(),
            slides: ctx.templates.slides.snapshot(),
        }
    }
}

/// Build every file of `target`.
pub fn build_target(
    ctx: &BuildContext,
    target: BuildTarget,
    progress: Option<&ProgressLine>,
) -> TargetReport {
    let files = ctx.selectors.get(target).collect();
    process_files(ctx, target, &files, progress)
}

/// Rebuild only `paths`. Paths the target does not select, or that no
/// longer exist, are ignored.
pub fn rebuild_paths(ctx: &BuildContext, target: BuildTarget, paths: &[PathBuf]) -> TargetReport {
    let selector = ctx.selectors.get(target);
    let files: Vec<PathBuf> = paths
        .iter()
        .filter(|path| selector.matches(path) && path.is_file())
        .cloned()
        .collect();
    if target != BuildTarget::Slides || files.is_empty() {
        return process_files(ctx, target, &files, None);
    }
    // A changed deck may now collide with one that did not change.
    let all = selector.collect();
    process_selected(ctx, target, &files, &all, None)
}

/// Delete the outputs derived from removed sources.
///
/// A deck another source still plans to is rebuilt from that source
/// instead of being deleted.
pub fn remove_outputs(ctx: &BuildContext, target: BuildTarget, paths: &[PathBuf]) -> TargetReport {
    let mut report = TargetReport::new(target);
    let stop = &ctx.config.build.output;

    let remaining = if target == BuildTarget::Slides {
        ctx.selectors.get(target).collect()
    } else {
        Vec::new()
    };
    let claims = deck_claims(ctx, &remaining);
    let mut claimed = Vec::new();

    for path in paths {
        let result = output_path(ctx, target, path).and_then(|dest| {
            if let Some(sources) = claims.get(&dest) {
                claimed.extend(sources.iter().cloned());
                return Ok(None);
            }
            let removed = remove_output(&dest, stop)?;
            Ok(removed.then_some(dest))
        });
        match result {
            Ok(Some(dest)) => {
                debug!("remove"; "{}", ctx.display(&dest));
                report.removed.push(dest);
            }
            Ok(None) => {}
            Err(error) => report.failures.push(FileFailure {
                path: path.clone(),
                error,
            }),
        }
    }

    if !claimed.is_empty() {
        claimed.sort();
        claimed.dedup();
        let rebuilt = process_selected(ctx, target, &claimed, &remaining, None);
        report.written.extend(rebuilt.written);
        report.failures.extend(rebuilt.failures);
    }

    report
}

/// Planned deck page of every source, with the sources planned to it.
fn deck_claims(ctx: &BuildContext, sources: &[PathBuf]) -> FxHashMap<PathBuf, Vec<PathBuf>> {
    let mut claims: FxHashMap<PathBuf, Vec<PathBuf>> = FxHashMap::default();
    for source in sources {
        if let Ok(dest) = output_path(ctx, BuildTarget::Slides, source) {
            claims.entry(dest).or_default().push(source.clone());
        }
    }
    claims
}

/// Sources that share their deck page with another source, mapped to the
/// sources they collide with.
fn deck_collisions(ctx: &BuildContext, sources: &[PathBuf]) -> FxHashMap<PathBuf, Vec<PathBuf>> {
    let mut collisions = FxHashMap::default();
    for mut claimants in deck_claims(ctx, sources).into_values() {
        if claimants.len() < 2 {
            continue;
        }
        claimants.sort();
        for source in &claimants {
            let others = claimants.iter().filter(|o| *o != source).cloned().collect();
            collisions.insert(source.clone(), others);
        }
    }
    collisions
}

pub(super) fn process_files(
    ctx: &BuildContext,
    target: BuildTarget,
    files: &[PathBuf],
    progress: Option<&ProgressLine>,
) -> TargetReport {
    process_selected(ctx, target, files, files, progress)
}

/// Process `files`, checking deck collisions against every source in `all`.
fn process_selected(
    ctx: &BuildContext,
    target: BuildTarget,
    files: &[PathBuf],
    all: &[PathBuf],
    progress: Option<&ProgressLine>,
) -> TargetReport {
    let snapshots = Snapshots::take(ctx);
    let collisions = if target == BuildTarget::Slides {
        deck_collisions(ctx, all)
    } else {
        FxHashMap::default()
    };

    let results: Vec<(PathBuf, Result<PathBuf>)> = files
        .par_iter()
        .map(|path| {
            let result = match collisions.get(path) {
                Some(others) => Err(collision_error(ctx, others)),
                None => process_file(ctx, target, path, &snapshots),
            };
            if let Some(progress) = progress {
                progress.inc(target.name());
            }
            (path.clone(), result)
        })
        .collect();

    let mut report = TargetReport::new(target);
    for (path, result) in results {
        match result {
            Ok(dest) => report.written.push(dest),
            Err(error) => report.failures.push(FileFailure { path, error }),
        }
    }
    report
}

fn collision_error(ctx: &BuildContext, others: &[PathBuf]) -> anyhow::Error {
    let others: Vec<String> = others.iter().map(|o| ctx.display(o)).collect();
    anyhow!("same deck page as {}, rename one of them", others.join(", "))
}

fn process_file(
    ctx: &BuildContext,
    target: BuildTarget,
    path: &Path,
    snapshots: &Snapshots,
) -> Result<PathBuf> {
    let config = &ctx.config;

    match target {
        BuildTarget::Assets | BuildTarget::Content => {
            let dest = output_path(ctx, target, path)?;
            copy_file(path, &dest)?;
            Ok(dest)
        }
        BuildTarget::Index => {
            let markdown = read_markdown(path)?;
            let page = render_index(&markdown, &snapshots.index, config)?;
            write_page(&page)?;
            Ok(page.dest)
        }
        BuildTarget::Slides => {
            let plan = plan_slide(&config.build.content, path)?;
            let markdown = read_markdown(path)?;
            let page = render_slides(&plan, &markdown, &snapshots.slides, config)?;
            write_page(&page)?;
            Ok(page.dest)
        }
    }
}

/// Where the output of `path` goes, without reading it.
pub fn output_path(ctx: &BuildContext, target: BuildTarget, path: &Path) -> Result<PathBuf> {
    let config = &ctx.config;
    let mirrored = |base: &Path, out: PathBuf| -> Result<PathBuf> {
        let rel = path
            .strip_prefix(base)
            .with_context(|| format!("{} is outside {}", path.display(), base.display()))?;
        Ok(out.join(rel))
    };

    match target {
        BuildTarget::Assets => mirrored(&config.build.assets, config.assets_output_dir()),
        BuildTarget::Content => mirrored(&config.build.content, config.content_output_dir()),
        BuildTarget::Index => Ok(config.build.output.join("index.html")),
        BuildTarget::Slides => {
            let plan = plan_slide(&config.build.content, path)?;
            Ok(config.content_output_dir().join(plan.dest))
        }
    }
}

fn read_markdown(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
