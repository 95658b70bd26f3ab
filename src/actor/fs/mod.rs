//! FileSystem Actor
//!
//! Watches the sources and sends debounced, routed changes to the
//! BuildActor. The watcher starts before the initial build so nothing
//! edited during that build is lost.
//!
//! ```text
//! Watcher → Debouncer (timing) → Classifier (fs state) → Router → BuildMsg
//! ```

use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::pipeline::BuildContext;

mod classifier;
mod debouncer;
mod router;
mod types;
mod watch_roots;


use classifier::EventClassifier;
use debouncer::Debouncer;
use router::{events_to_changes, log_events};
use watch_roots::WatchRoots;

pub use watch_roots::WatchRoot;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// notify callback → actor (sync side)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to flow
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    build_tx: mpsc::Sender<BuildMsg>,
    debouncer: Debouncer,
    ctx: Arc<BuildContext>,
}

impl FsActor {
    /// Start watching `roots` right away; events buffer until [`run`](Self::run).
    pub fn new(
        roots: Vec<WatchRoot>,
        build_tx: mpsc::Sender<BuildMsg>,
        ctx: Arc<BuildContext>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(roots);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new(),
            ctx,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            build_tx,
            mut debouncer,
            ctx,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify has no async API; bridge it from a plain thread.
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                () = tokio::time::sleep(next_wake(&debouncer)) => {
                    watch_roots.maintain(&mut watcher);
                    if process_changes(&mut debouncer, &build_tx, &ctx).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Poll slowly while the initial build runs; a ready batch has to wait anyway.
fn next_wake(debouncer: &Debouncer) -> Duration {
    let wait = debouncer.sleep_duration();
    if crate::core::is_serving() {
        wait
    } else {
        wait.max(Duration::from_millis(100))
    }
}

/// Release a ready batch to the BuildActor.
///
/// Returns `Err(())` once the BuildActor is gone.
async fn process_changes(
    debouncer: &mut Debouncer,
    build_tx: &mpsc::Sender<BuildMsg>,
    ctx: &BuildContext,
) -> Result<(), ()> {
    // Events keep collecting until the initial build is done.
    if !crate::core::is_serving() {
        return Ok(());
    }

    let Some(raw) = debouncer.take_if_ready() else {
        return Ok(());
    };
    let Some(events) = EventClassifier::classify(raw) else {
        return Ok(());
    };

    log_events(&events, ctx);
    let changes = events_to_changes(events, ctx);
    if changes.is_empty() {
        return Ok(());
    }

    build_tx
        .send(BuildMsg::Apply(changes))
        .await
        .map_err(|_| ())
}
