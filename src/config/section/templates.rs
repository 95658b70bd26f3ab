//! `[templates]` section configuration.
//!
//! ```toml
//! [templates]
//! index = "templates/index.html"    # main README page
//! slides = "templates/remark.html"  # every slide deck
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Page template paths, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub index: PathBuf,
    pub slides: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            index: "templates/index.html".into(),
            slides: "templates/remark.html".into(),
        }
    }
}

impl TemplatesConfig {
    pub(in crate::config) fn normalize(&mut self, root: &Path) {
        self.index = crate::utils::path::resolve_path(&self.index, root);
        self.slides = crate::utils::path::resolve_path(&self.slides, root);
    }

    pub fn validate(&self, diag: &mut crate::config::ConfigDiagnostics) {
        for (field, path) in [("templates.index", &self.index), ("templates.slides", &self.slides)] {
            if !path.is_file() {
                diag.error_with_hint(
                    field,
                    format!("template not found: {}", path.display()),
                    "create the file or point the field at an existing template",
                );
            }
        }
    }
}
