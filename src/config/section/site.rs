//! `[site]` section configuration.
//!
//! ```toml
//! [site]
//! title = "COMEM+ Web Dev"
//! version = "2017-2018"
//! repo_url = "https://github.com/MediaComem/comem-webdev"
//! ```

use serde::{Deserialize, Serialize};

/// Course metadata, exposed to both templates as `site`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfoConfig {
    /// Appended to every deck title: `"<deck> (<title>)"`.
    pub title: String,
    pub version: Option<String>,
    pub repo_url: Option<String>,
}

impl Default for SiteInfoConfig {
    fn default() -> Self {
        Self {
            title: "Course".to_string(),
            version: None,
            repo_url: None,
        }
    }
}

impl SiteInfoConfig {
    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if self.title.trim().is_empty() {
            diag.error("site.title", "must not be empty");
        }
        if let Some(url) = &self.repo_url
            && url::Url::parse(url).is_err()
        {
            diag.error("site.repo_url", format!("not a valid URL: {url}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_site_config() {
        let config = test_parse_config(
            "[site]\ntitle = \"COMEM+ Web Dev\"\nversion = \"2017-2018\"\nrepo_url = \"https://github.com/MediaComem/comem-webdev\"",
        );
        assert_eq!(config.site.title, "COMEM+ Web Dev");
        assert_eq!(config.site.version.as_deref(), Some("2017-2018"));
        assert!(config.site.repo_url.is_some());
    }

    #[test]
    fn test_site_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.site.title, "Course");
        assert!(config.site.version.is_none());
    }
}
