//! `[publish]` section configuration.
//!
//! ```toml
//! [publish]
//! git_url = "git@github.com:MediaComem/comem-webdev-docs.git"
//! branch = "master"
//! base_url = "https://mediacomem.github.io/comem-webdev-docs"
//! version = "2017-2018"
//! ```

use serde::{Deserialize, Serialize};

/// Where `publish` pushes the built site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub git_url: Option<String>,
    pub branch: String,
    /// Public URL of the published site, shown after a push.
    pub base_url: Option<String>,
    /// Used in the publish commit message.
    pub version: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            git_url: None,
            branch: "master".to_string(),
            base_url: None,
            version: None,
        }
    }
}

impl PublishConfig {
    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        match self.git_url.as_deref() {
            None | Some("") => diag.error_with_hint(
                "publish.git_url",
                "required by `publish`",
                "set it to the repository that hosts the built site",
            ),
            Some(_) => {}
        }
        if self.branch.trim().is_empty() {
            diag.error("publish.branch", "must not be empty");
        }
        if let Some(url) = &self.base_url
            && url::Url::parse(url).is_err()
        {
            diag.error("publish.base_url", format!("not a valid URL: {url}"));
        }
    }
}
