//! Page templates with copy-on-write reload.
//!
//! A [`TemplateHandle`] owns the current [`TemplateSnapshot`] behind an
//! `ArcSwap`. A render takes one snapshot and uses it from start to finish;
//! a reload compiles the new source into a fresh snapshot and only then
//! swaps it in, so no render ever sees a half-updated template.
//!
//! ```text
//! render A ──load()──► snapshot v1 ─────────────── render with v1
//! reload   ───────────── compile v2 ──store()──►
//! render B ─────────────────────────────load()──► snapshot v2
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

use crate::utils::hash;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read template `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template `{}` does not compile", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render template `{}`", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },
}

/// One compiled version of a template file. Never mutated after creation.
#[derive(Debug)]
pub struct TemplateSnapshot {
    env: Environment<'static>,
    name: String,
    path: PathBuf,
    version: u64,
    hash: u64,
}

impl TemplateSnapshot {
    fn compile(path: &Path, source: String, version: u64) -> Result<Self, TemplateError> {
        let hash = hash::compute(&source);
        // The file name keeps its extension so `.html` templates auto-escape.
        let name = path
            .file_name()
            .map_or_else(|| "template.html".to_string(), |n| n.to_string_lossy().into_owned());

        let mut env = Environment::new();
        env.add_template_owned(name.clone(), source)
            .map_err(|source| TemplateError::Syntax {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            env,
            name,
            path: path.to_path_buf(),
            version,
            hash,
        })
    }

    /// Render with a serializable context.
    pub fn render<C: Serialize>(&self, context: C) -> Result<String, TemplateError> {
        self.env
            .get_template(&self.name)
            .and_then(|template| template.render(context))
            .map_err(|source| TemplateError::Render {
                path: self.path.clone(),
                source,
            })
    }

    #[inline]
    pub const fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub const fn hash(&self) -> u64 {
        self.hash
    }
}

/// Result of [`TemplateHandle::reload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The file content is identical to the current snapshot.
    Unchanged,
    /// A new snapshot was published.
    Reloaded { version: u64 },
}

/// Process-wide handle to one template file.
#[derive(Debug)]
pub struct TemplateHandle {
    path: PathBuf,
    current: ArcSwap<TemplateSnapshot>,
}

impl TemplateHandle {
    /// Read and compile `path`. A missing file is a configuration error.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = read_source(path)?;
        let snapshot = TemplateSnapshot::compile(path, source, 1)?;
        Ok(Self {
            path: path.to_path_buf(),
            current: ArcSwap::from_pointee(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The snapshot to use for one complete render.
    pub fn snapshot(&self) -> Arc<TemplateSnapshot> {
        self.current.load_full()
    }

    /// Re-read the file and publish a new snapshot if its content changed.
    ///
    /// On error the previous snapshot stays in place.
    pub fn reload(&self) -> Result<ReloadOutcome, TemplateError> {
        let source = read_source(&self.path)?;
        let current = self.current.load();
        if hash::compute(&source) == current.hash {
            return Ok(ReloadOutcome::Unchanged);
        }

        let version = current.version + 1;
        let snapshot = TemplateSnapshot::compile(&self.path, source, version)?;
        self.current.store(Arc::new(snapshot));
        Ok(ReloadOutcome::Reloaded { version })
    }
}

fn read_source(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            TemplateError::NotFound(path.to_path_buf())
        } else {
            TemplateError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_template(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("remark.html");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(dir.path(), "<title>{{ title }}</title>");

        let handle = TemplateHandle::load(&path).unwrap();
        let html = handle.snapshot().render(json!({ "title": "A & B" })).unwrap();
        assert_eq!(html, "<title>A &amp; B</title>");
        assert_eq!(handle.snapshot().version(), 1);
    }

    #[test]
    fn test_missing_template_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");

        let err = TemplateHandle::load(&path).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(ref p) if *p == path));
        assert!(err.to_string().contains("missing.html"));
    }

    #[test]
    fn test_syntax_error_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(dir.path(), "{% if %}");
        assert!(matches!(
            TemplateHandle::load(&path),
            Err(TemplateError::Syntax { .. })
        ));
    }

    #[test]
    fn test_reload_publishes_new_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(dir.path(), "v1 {{ title }}");
        let handle = TemplateHandle::load(&path).unwrap();

        let before = handle.snapshot();
        write_template(dir.path(), "v2 {{ title }}");
        assert_eq!(handle.reload().unwrap(), ReloadOutcome::Reloaded { version: 2 });

        // A snapshot taken before the reload keeps rendering the old source.
        assert_eq!(before.render(json!({ "title": "x" })).unwrap(), "v1 x");
        assert_eq!(handle.snapshot().render(json!({ "title": "x" })).unwrap(), "v2 x");
    }

    #[test]
    fn test_reload_unchanged_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(dir.path(), "{{ title }}");
        let handle = TemplateHandle::load(&path).unwrap();

        let before = handle.snapshot();
        assert_eq!(handle.reload().unwrap(), ReloadOutcome::Unchanged);
        assert!(Arc::ptr_eq(&before, &handle.snapshot()));
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_template(dir.path(), "ok {{ title }}");
        let handle = TemplateHandle::load(&path).unwrap();

        write_template(dir.path(), "broken {{ title");
        assert!(matches!(handle.reload(), Err(TemplateError::Syntax { .. })));
        assert_eq!(handle.snapshot().version(), 1);
        assert_eq!(handle.snapshot().render(json!({ "title": "x" })).unwrap(), "ok x");

        fs::remove_file(&path).unwrap();
        assert!(matches!(handle.reload(), Err(TemplateError::NotFound(_))));
        assert_eq!(handle.snapshot().render(json!({ "title": "x" })).unwrap(), "ok x");
    }
}
