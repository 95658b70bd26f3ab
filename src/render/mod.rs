//! Page rendering: Markdown in, final HTML bytes out.
//!
//! - [`slides`]: one remark.js deck per content-tree document
//! - [`index`]: the course index from the main readme
//! - [`template`]: reloadable minijinja templates
//! - [`title`], [`markdown`], [`remark`]: the text transforms they share
//! - [`toc`]: doctoc tables of contents written back into the sources
//!
//! Rendering never touches the output directory; writing pages is the
//! pipeline's job.

pub mod index;
pub mod markdown;
pub mod remark;
pub mod slides;
pub mod template;
pub mod title;
pub mod toc;

use std::path::{Path, PathBuf};

pub use index::render_index;
pub use slides::render_slides;
pub use template::{ReloadOutcome, TemplateError, TemplateHandle, TemplateSnapshot};
pub use toc::update_toc;

use crate::config::TemplatesConfig;

/// A finished page. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub bytes: Vec<u8>,
}

/// Which page template a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Index,
    Slides,
}

impl TemplateKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Index => "index template",
            Self::Slides => "slide template",
        }
    }
}

/// The two page templates of a build.
#[derive(Debug)]
pub struct Templates {
    pub index: TemplateHandle,
    pub slides: TemplateHandle,
}

impl Templates {
    /// Load both templates. A missing file is fatal.
    pub fn load(config: &TemplatesConfig) -> Result<Self, TemplateError> {
        Ok(Self {
            index: TemplateHandle::load(&config.index)?,
            slides: TemplateHandle::load(&config.slides)?,
        })
    }

    pub const fn get(&self, kind: TemplateKind) -> &TemplateHandle {
        match kind {
            TemplateKind::Index => &self.index,
            TemplateKind::Slides => &self.slides,
        }
    }

    /// Which template lives at `path`, if any.
    pub fn kind_of(&self, path: &Path) -> Option<TemplateKind> {
        if path == self.slides.path() {
            Some(TemplateKind::Slides)
        } else if path == self.index.path() {
            Some(TemplateKind::Index)
        } else {
            None
        }
    }
}
