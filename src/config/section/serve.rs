//! `[serve]` section configuration.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 3000                 # HTTP port number
//! livereload_port = 35729     # Websocket port for live reload
//! open = true                 # Open a browser once the server is up
//! browser = "firefox"         # Optional, platform default otherwise
//! ```
//!
//! `PORT`, `LIVERELOAD_PORT` and `BROWSER` override the file.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Development server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    pub port: u16,

    pub livereload_port: u16,

    pub open: bool,

    /// Browser command used to open the site.
    pub browser: Option<String>,

    /// Rebuild on change (CLI only, `--no-watch` disables).
    #[serde(skip)]
    pub watch: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            livereload_port: 35729,
            open: true,
            browser: None,
            watch: true,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if self.port == self.livereload_port {
            diag.error_with_hint(
                "serve.livereload_port",
                format!("same as serve.port ({})", self.port),
                "pick two different ports",
            );
        }
    }
}
