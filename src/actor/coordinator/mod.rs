//! Actor Coordinator - wires up the watch actors.
//!
//! The watcher is attached in [`Coordinator::new`], before the caller runs
//! the initial build; [`Coordinator::run`] then drives the actors until
//! shutdown.

mod runtime;
mod watch_paths;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::builder::BuildActor;
use super::fs::FsActor;
use super::messages::{BuildMsg, WsMsg};
use super::ws::WsActor;
use crate::pipeline::BuildContext;

const CHANNEL_BUFFER: usize = 32;

pub struct Coordinator {
    ctx: Arc<BuildContext>,
    fs: FsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    build_rx: mpsc::Receiver<BuildMsg>,
    ws_port: Option<u16>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    /// Start watching right away.
    pub fn new(ctx: Arc<BuildContext>) -> Result<Self> {
        let (build_tx, build_rx) = mpsc::channel::<BuildMsg>(CHANNEL_BUFFER);
        let roots = watch_paths::collect_watch_roots(&ctx.config);
        let fs = FsActor::new(roots, build_tx.clone(), Arc::clone(&ctx))
            .map_err(|e| anyhow!("watcher failed: {}", e))?;

        Ok(Self {
            ctx,
            fs,
            build_tx,
            build_rx,
            ws_port: None,
            shutdown_rx: None,
        })
    }

    /// Serve live reload on `port` (or the next free one).
    pub fn with_ws_port(mut self, port: u16) -> Self {
        self.ws_port = Some(port);
        self
    }

    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until the shutdown signal, or until an actor stops.
    pub async fn run(self) -> Result<()> {
        let Self {
            ctx,
            fs,
            build_tx,
            build_rx,
            ws_port,
            shutdown_rx,
        } = self;

        let ws = ws_port.and_then(|port| start_live_reload(&ctx, port));
        let ws_tx = ws.as_ref().map(|(tx, _)| tx.clone());
        let build = BuildActor::new(build_rx, ws_tx, ctx);

        crate::debug!("actor"; "start");
        runtime::run_actors(fs, build, ws, build_tx, shutdown_rx).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

/// Bind the reload server. Serving goes on without live reload if that fails.
fn start_live_reload(ctx: &BuildContext, port: u16) -> Option<(mpsc::Sender<WsMsg>, WsActor)> {
    let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);
    let interface = ctx.config.serve.interface;
    match crate::reload::server::start_ws_server(interface, port, ws_tx.clone()) {
        Ok(actual) => {
            if actual != port {
                crate::log!("reload"; "port {} in use, using {} instead", port, actual);
            }
            crate::cli::serve::set_actual_ws_port(actual);
            crate::debug!("reload"; "ws://{}:{}", interface, actual);
            Some((ws_tx, WsActor::new(ws_rx)))
        }
        Err(e) => {
            crate::log!("reload"; "live reload disabled: {:#}", e);
            None
        }
    }
}
