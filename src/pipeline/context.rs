//! Everything a build needs, shared by all targets and the watch loop.

use std::path::Path;

use anyhow::Result;

use super::Selectors;
use crate::config::SiteConfig;
use crate::render::Templates;

#[derive(Debug)]
pub struct BuildContext {
    pub config: SiteConfig,
    pub templates: Templates,
    pub selectors: Selectors,
}

impl BuildContext {
    /// Load the page templates and compile the target selectors. A missing
    /// or broken template is fatal here, as is a bad exclusion glob.
    pub fn new(config: SiteConfig) -> Result<Self> {
        let templates = Templates::load(&config.templates)?;
        let selectors = Selectors::new(&config)?;
        Ok(Self {
            config,
            templates,
            selectors,
        })
    }

    /// Display form of a path, relative to the project root when possible.
    pub fn display(&self, path: &Path) -> String {
        self.config.root_relative(path).display().to_string()
    }
}
