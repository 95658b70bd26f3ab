//! Development server with live reload.
//!
//! ```text
//! bind HTTP ─► attach watcher ─► initial build (background) ─► open browser
//!                                       │
//! request loop ◄── 503 loading page ────┘ until done
//! ```

mod content;
mod lifecycle;
mod path;
mod response;

pub use lifecycle::run_actor_system;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::actor::Coordinator;
use crate::embed::serve::LIVERELOAD_URL;
use crate::pipeline::{BuildContext, build_all};
use crate::utils::exec::{Cmd, SILENT_FILTER};
use crate::{debug, log};
use path::Resolved;

/// Live reload port actually bound; 0 while live reload is off.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Record the bound live reload port (called by the coordinator).
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// `serve`: build, serve the output, rebuild and reload on change.
pub fn serve_site(ctx: BuildContext) -> Result<()> {
    let ctx = Arc::new(ctx);
    let serve = &ctx.config.serve;

    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    // Attached before the initial build so no edit made during it is lost.
    let coordinator = if serve.watch {
        Some(Coordinator::new(Arc::clone(&ctx))?)
    } else {
        None
    };

    let url = site_url(addr);
    log!("serve"; "{}", url);

    let build_ctx = Arc::clone(&ctx);
    std::thread::spawn(move || initial_build(&build_ctx));

    let actors = coordinator.map(|coordinator| {
        lifecycle::spawn_actors(coordinator, Some(serve.livereload_port), shutdown_rx)
    });

    if serve.open {
        open_browser(&url, serve.browser.as_deref());
    }

    run_request_loop(&server, &ctx);
    lifecycle::wait_for_shutdown(actors);
    Ok(())
}

fn initial_build(ctx: &BuildContext) {
    if let Err(e) = build_all(ctx, false) {
        // Serve what was built; fixing a file triggers a rebuild.
        log!("error"; "{:#}", e);
    }
    crate::core::set_serving();
    if ctx.config.serve.watch {
        log!("watch"; "watching for changes");
    }
}

fn site_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}/", addr.port())
    } else {
        format!("http://{addr}/")
    }
}

/// Open `url` in the configured browser, or the platform default.
fn open_browser(url: &str, browser: Option<&str>) {
    let cmd = match browser {
        Some(browser) => Cmd::new(shellexpand::tilde(browser).into_owned()).arg(url),
        None => default_opener(url),
    };
    let url = url.to_string();
    // A browser started directly only returns once it is closed.
    std::thread::spawn(move || {
        if let Err(e) = cmd.filter(&SILENT_FILTER).run() {
            log!("serve"; "could not open {}: {:#}", url, e);
        }
    });
}

#[cfg(target_os = "macos")]
fn default_opener(url: &str) -> Cmd {
    Cmd::new("open").arg(url)
}

#[cfg(windows)]
fn default_opener(url: &str) -> Cmd {
    Cmd::new("cmd").args(["/C", "start", "", url])
}

#[cfg(not(any(target_os = "macos", windows)))]
fn default_opener(url: &str) -> Cmd {
    Cmd::new("xdg-open").arg(url)
}

fn run_request_loop(server: &Server, ctx: &Arc<BuildContext>) {
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(4).build() {
        Ok(pool) => pool,
        Err(e) => {
            log!("serve"; "failed to create request pool: {}", e);
            return;
        }
    };

    for request in server.incoming_requests() {
        let ctx = Arc::clone(ctx);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                debug!("serve"; "request error: {:#}", e);
            }
        });
    }
}

fn handle_request(request: Request, ctx: &BuildContext) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = actual_ws_port();
    if let Some(port) = ws_port
        && request.url() == LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    if !crate::core::is_serving() {
        return response::respond_loading(request, &ctx.config.site.title);
    }

    match path::resolve_path(request.url(), &ctx.config.build.output) {
        Some(Resolved::File(path)) => response::respond_file(request, &path, ws_port),
        Some(Resolved::Redirect(location)) => response::respond_redirect(request, &location),
        None => response::respond_not_found(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_site_url() {
        let any = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);
        assert_eq!(site_url(any), "http://localhost:3000/");
        let local = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3001);
        assert_eq!(site_url(local), "http://127.0.0.1:3001/");
    }
}
