//! Build Actor - applies watched changes to the build directory.
//!
//! Messages are handled one at a time, so a batch arriving during a rebuild
//! waits in the channel. Failures are reported on the watch status line and
//! the actor keeps running.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{BuildMsg, Change, WsMsg};
use crate::logger::{status_error, status_success};
use crate::pipeline::{
    BuildContext, BuildTarget, TargetReport, build_target, rebuild_paths, remove_outputs,
};
use crate::render::{ReloadOutcome, TemplateKind};
use crate::utils::plural::plural_count;

/// What one batch did.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<TargetReport>,
    /// Failures that are not tied to one source file.
    pub errors: Vec<String>,
}

impl BatchOutcome {
    pub fn changed(&self) -> bool {
        self.reports.iter().any(TargetReport::changed)
    }

    pub fn written(&self) -> usize {
        self.reports.iter().map(|r| r.written.len()).sum()
    }

    pub fn removed(&self) -> usize {
        self.reports.iter().map(|r| r.removed.len()).sum()
    }

    /// One line per failure, file failures first.
    pub fn failures(&self, ctx: &BuildContext) -> Vec<String> {
        self.reports
            .iter()
            .flat_map(|r| &r.failures)
            .map(|f| format!("{}: {:#}", ctx.display(&f.path), f.error))
            .chain(self.errors.iter().cloned())
            .collect()
    }

    fn summary(&self) -> String {
        match (self.written(), self.removed()) {
            (0, 0) => "up to date".to_string(),
            (written, 0) => format!("rebuilt {}", plural_count(written, "file")),
            (0, removed) => format!("removed {}", plural_count(removed, "output")),
            (written, removed) => format!(
                "rebuilt {}, removed {}",
                plural_count(written, "file"),
                plural_count(removed, "output")
            ),
        }
    }
}

/// The target whose pages are rendered with `kind`.
const fn rendered_by(kind: TemplateKind) -> BuildTarget {
    match kind {
        TemplateKind::Index => BuildTarget::Index,
        TemplateKind::Slides => BuildTarget::Slides,
    }
}

/// Apply a batch in order. Blocking; runs the per-target work on rayon.
pub fn apply_changes(ctx: &BuildContext, changes: &[Change]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for change in changes {
        match change {
            Change::Rebuild { target, paths } => {
                outcome.reports.push(rebuild_paths(ctx, *target, paths));
            }
            Change::Remove { target, paths } => {
                outcome.reports.push(remove_outputs(ctx, *target, paths));
            }
            Change::Template(kind) => match ctx.templates.get(*kind).reload() {
                Ok(ReloadOutcome::Unchanged) => {
                    crate::debug!("watch"; "{} unchanged", kind.label());
                }
                Ok(ReloadOutcome::Reloaded { version }) => {
                    crate::debug!("watch"; "{} reloaded (v{})", kind.label(), version);
                    outcome.reports.push(build_target(ctx, rendered_by(*kind), None));
                }
                Err(e) => outcome.errors.push(format!("{}: {}", kind.label(), e)),
            },
        }
    }

    outcome
}

/// Build Actor - sequential rebuilds
pub struct BuildActor {
    rx: mpsc::Receiver<BuildMsg>,
    /// None when watching without a server.
    ws_tx: Option<mpsc::Sender<WsMsg>>,
    ctx: Arc<BuildContext>,
}

impl BuildActor {
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        ws_tx: Option<mpsc::Sender<WsMsg>>,
        ctx: Arc<BuildContext>,
    ) -> Self {
        Self { rx, ws_tx, ctx }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                BuildMsg::Apply(changes) => self.handle_batch(changes).await,
                BuildMsg::Shutdown => {
                    crate::debug!("build"; "shutting down");
                    break;
                }
            }
        }
    }

    async fn handle_batch(&self, changes: Vec<Change>) {
        let ctx = Arc::clone(&self.ctx);
        let result = tokio::task::spawn_blocking(move || apply_changes(&ctx, &changes)).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                status_error("rebuild crashed", &e.to_string());
                return;
            }
        };

        let failures = outcome.failures(&self.ctx);
        if failures.is_empty() {
            status_success(&outcome.summary());
        } else {
            let summary = format!(
                "{} ({} failed)",
                outcome.summary(),
                plural_count(failures.len(), "file")
            );
            status_error(&summary, &failures.join("\n"));
        }

        if outcome.changed() {
            self.notify_reload(&outcome.summary());
        }
    }

    /// Fire-and-forget: a full or closed channel only costs one reload.
    fn notify_reload(&self, reason: &str) {
        let Some(tx) = &self.ws_tx else { return };
        let msg = WsMsg::Reload {
            reason: reason.to_string(),
        };
        if let Err(e) = tx.try_send(msg) {
            crate::debug!("ws"; "reload not sent: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{test_config, test_site};
    use std::fs;

    fn built(dir: &std::path::Path) -> BuildContext {
        test_site(dir);
        let ctx = BuildContext::new(test_config(dir)).unwrap();
        crate::pipeline::build_all(&ctx, true).unwrap();
        ctx
    }

    #[test]
    fn test_rebuild_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = built(dir.path());
        let install = ctx.config.build.content.join("js/INSTALL.md");
        fs::write(&install, "# Install\n").unwrap();

        let outcome = apply_changes(
            &ctx,
            &[Change::Rebuild {
                target: BuildTarget::Slides,
                paths: vec![install.clone()],
            }],
        );
        let deck = ctx.config.content_output_dir().join("js/install/index.html");
        assert!(deck.is_file());
        assert_eq!(outcome.written(), 1);
        assert_eq!(outcome.summary(), "rebuilt 1 file");

        fs::remove_file(&install).unwrap();
        let outcome = apply_changes(
            &ctx,
            &[Change::Remove {
                target: BuildTarget::Slides,
                paths: vec![install],
            }],
        );
        assert!(!deck.exists());
        assert!(outcome.changed());
        assert_eq!(outcome.summary(), "removed 1 output");
    }

    #[test]
    fn test_template_change_rerenders_its_pages() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = built(dir.path());
        let index_out = ctx.config.build.output.join("index.html");
        let index_before = fs::read(&index_out).unwrap();

        fs::write(
            &ctx.config.templates.slides,
            "<html><title>{{ title }}</title><p>v2</p></html>",
        )
        .unwrap();
        let outcome = apply_changes(&ctx, &[Change::Template(TemplateKind::Slides)]);

        assert!(outcome.failures(&ctx).is_empty());
        assert_eq!(outcome.written(), 1);
        let deck =
            fs::read_to_string(ctx.config.content_output_dir().join("js/index.html")).unwrap();
        assert!(deck.contains("<p>v2</p>"));
        assert_eq!(fs::read(&index_out).unwrap(), index_before);
    }

    #[test]
    fn test_unchanged_template_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = built(dir.path());
        let outcome = apply_changes(&ctx, &[Change::Template(TemplateKind::Index)]);
        assert!(!outcome.changed());
        assert_eq!(outcome.summary(), "up to date");
    }

    #[test]
    fn test_broken_template_reported_old_kept() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = built(dir.path());
        fs::write(&ctx.config.templates.index, "{% if %}").unwrap();

        let outcome = apply_changes(&ctx, &[Change::Template(TemplateKind::Index)]);
        let failures = outcome.failures(&ctx);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("index template: "));
        assert_eq!(ctx.templates.index.snapshot().version(), 1);
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = built(dir.path());
        let broken = ctx.config.build.content.join("js/BROKEN.md");
        fs::write(&broken, [0xff, 0xfe]).unwrap();
        fs::write(ctx.config.build.content.join("js/README.md"), "# JS v2\n").unwrap();

        let outcome = apply_changes(
            &ctx,
            &[
                Change::Rebuild {
                    target: BuildTarget::Slides,
                    paths: vec![broken],
                },
                Change::Rebuild {
                    target: BuildTarget::Slides,
                    paths: vec![ctx.config.build.content.join("js/README.md")],
                },
            ],
        );
        assert_eq!(outcome.failures(&ctx).len(), 1);
        assert_eq!(outcome.written(), 1);
    }

    #[tokio::test]
    async fn test_actor_sends_reload_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Arc::new(built(dir.path()));
        let (build_tx, build_rx) = mpsc::channel(4);
        let (ws_tx, mut ws_rx) = mpsc::channel(4);
        let actor = BuildActor::new(build_rx, Some(ws_tx), Arc::clone(&ctx));
        let handle = tokio::spawn(actor.run());

        build_tx
            .send(BuildMsg::Apply(vec![Change::Rebuild {
                target: BuildTarget::Index,
                paths: vec![ctx.config.build.readme.clone()],
            }]))
            .await
            .unwrap();
        build_tx.send(BuildMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert!(matches!(ws_rx.recv().await, Some(WsMsg::Reload { .. })));
    }
}
