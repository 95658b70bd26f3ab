use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::builder::BuildActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BuildMsg, WsMsg};
use crate::actor::ws::WsActor;

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    build: BuildActor,
    ws: Option<(mpsc::Sender<WsMsg>, WsActor)>,
    build_tx: mpsc::Sender<BuildMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = tokio::spawn(fs.run());
    let build_handle = tokio::spawn(build.run());
    let (ws_tx, ws_handle) = match ws {
        Some((tx, actor)) => (Some(tx), Some(tokio::spawn(actor.run()))),
        None => (None, None),
    };

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = fs_handle => {}
            _ = build_handle => {}
        }
        return;
    }

    // A rebuild in progress finishes first.
    let _ = build_tx.send(BuildMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_secs(2), build_handle).await;

    if let (Some(tx), Some(handle)) = (ws_tx, ws_handle) {
        let _ = tx.send(WsMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
    }
    fs_handle.abort();
}
