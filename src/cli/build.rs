//! `build`, `clean` and `watch` commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;

use crate::actor::Coordinator;
use crate::config::SiteConfig;
use crate::pipeline::{BuildContext, BuildSummary, build_all, clean_dir};
use crate::{debug, log};

/// `build`: run every target once.
pub fn build_site(ctx: &BuildContext) -> Result<BuildSummary> {
    build_all(ctx, false)
}

/// `clean`: remove the output and PDF staging trees.
pub fn clean_site(config: &SiteConfig) -> Result<()> {
    let mut removed = 0;
    for dir in [&config.build.output, &config.pdf.staging] {
        let existed =
            clean_dir(dir).with_context(|| format!("failed to remove {}", dir.display()))?;
        if existed {
            debug!("clean"; "removed {}", config.root_relative(dir).display());
            removed += 1;
        }
    }

    if removed == 0 {
        log!("clean"; "nothing to remove");
    } else {
        log!("clean"; "done");
    }
    Ok(())
}

/// `watch`: build once, then rebuild on every change until Ctrl+C.
pub fn watch_site(ctx: BuildContext) -> Result<()> {
    let ctx = Arc::new(ctx);
    let coordinator = Coordinator::new(Arc::clone(&ctx))?;

    if let Err(e) = build_all(&ctx, false) {
        // Fixing the broken file triggers a rebuild.
        log!("error"; "{:#}", e);
    }
    crate::core::set_serving();
    log!("watch"; "watching for changes");

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_shutdown(shutdown_tx);
    crate::cli::serve::run_actor_system(coordinator, None, shutdown_rx);
    Ok(())
}
