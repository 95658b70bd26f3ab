//! `[pdf]` section configuration.
//!
//! ```toml
//! [pdf]
//! output = "pdf"           # one PDF per deck
//! staging = "tmp/pdf"      # throwaway build the browser prints from
//! browser = "chromium"     # headless-capable Chromium-family browser
//! concurrency = 2          # decks printed at the same time
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Browser names tried when the configured one is not on `PATH`.
const BROWSER_FALLBACKS: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
    "msedge",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub output: PathBuf,
    pub staging: PathBuf,
    pub browser: String,
    pub concurrency: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            output: "pdf".into(),
            staging: "tmp/pdf".into(),
            browser: "chromium".to_string(),
            concurrency: 2,
        }
    }
}

impl PdfConfig {
    pub(in crate::config) fn normalize(&mut self, root: &Path) {
        use crate::utils::path::resolve_path;

        self.output = resolve_path(&self.output, root);
        self.staging = resolve_path(&self.staging, root);
    }

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if self.concurrency == 0 {
            diag.error("pdf.concurrency", "must be at least 1");
        }
        if self.resolve_browser().is_none() {
            diag.error_with_hint(
                "pdf.browser",
                format!("`{}` not found", self.browser),
                "install Chromium or set pdf.browser to a Chrome/Edge executable",
            );
        }
    }

    /// The configured browser if it resolves on `PATH` (or is a path),
    /// otherwise the first known Chromium-family name that does.
    pub fn resolve_browser(&self) -> Option<PathBuf> {
        let expanded = shellexpand::tilde(&self.browser).into_owned();
        std::iter::once(expanded.as_str())
            .chain(BROWSER_FALLBACKS.iter().copied())
            .find_map(|name| which::which(name).ok())
    }
}
