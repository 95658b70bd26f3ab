//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! content = "subjects"     # Markdown course tree
//! assets = "assets"        # copied to <output>/assets
//! readme = "README.md"     # rendered to <output>/index.html
//! output = "build"
//! webfonts = true
//! exclude = ["**/*.odg", "**/*.odg#", "**/node_modules/**"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source trees and output directory.
///
/// All paths are relative to the project root in the file and absolute
/// once the config is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    pub content: PathBuf,
    pub assets: PathBuf,
    pub readme: PathBuf,
    pub output: PathBuf,

    /// Passed to the slide template; disabled for PDF staging builds.
    pub webfonts: bool,

    /// Glob patterns, relative to the content root, never copied or rendered.
    pub exclude: Vec<String>,

    /// Remove the output directory first (CLI only).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            content: "subjects".into(),
            assets: "assets".into(),
            readme: "README.md".into(),
            output: "build".into(),
            webfonts: true,
            exclude: vec![
                "**/*.odg".to_string(),
                "**/*.odg#".to_string(),
                "**/node_modules/**".to_string(),
            ],
            clean: false,
        }
    }
}

impl BuildSectionConfig {
    pub(in crate::config) fn normalize(&mut self, root: &Path) {
        use crate::utils::path::resolve_path;

        self.content = resolve_path(&self.content, root);
        self.assets = resolve_path(&self.assets, root);
        self.readme = resolve_path(&self.readme, root);
        self.output = resolve_path(&self.output, root);
    }

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        if !self.content.is_dir() {
            diag.error(
                "build.content",
                format!("content directory not found: {}", self.content.display()),
            );
        }
        if !self.readme.is_file() {
            diag.error(
                "build.readme",
                format!("readme not found: {}", self.readme.display()),
            );
        }
        for pattern in &self.exclude {
            if let Err(e) = glob::Pattern::new(pattern) {
                diag.error("build.exclude", format!("invalid pattern `{pattern}`: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_build_config() {
        let config = test_parse_config(
            "[build]\ncontent = \"courses\"\noutput = \"public\"\nwebfonts = false\nexclude = []",
        );
        assert_eq!(config.build.content, PathBuf::from("courses"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(!config.build.webfonts);
        assert!(config.build.exclude.is_empty());
    }

    #[test]
    fn test_build_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.content, PathBuf::from("subjects"));
        assert_eq!(config.build.assets, PathBuf::from("assets"));
        assert_eq!(config.build.readme, PathBuf::from("README.md"));
        assert_eq!(config.build.exclude.len(), 3);
        assert!(config.build.webfonts);
    }

    #[test]
    fn test_normalize_resolves_against_root() {
        let mut build = BuildSectionConfig::default();
        build.normalize(Path::new("/course"));
        assert_eq!(build.content, PathBuf::from("/course/subjects"));
        assert_eq!(build.output, PathBuf::from("/course/build"));
    }

    #[test]
    fn test_validate_bad_exclude_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let mut build = BuildSectionConfig {
            exclude: vec!["[".to_string()],
            ..Default::default()
        };
        build.normalize(dir.path());

        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert!(diag.errors().iter().any(|e| e.field == "build.exclude"));
    }
}
