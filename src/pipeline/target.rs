//! Build targets and the files they select.
//!
//! | Target   | Base          | Selects                                  | Output                       |
//! |----------|---------------|------------------------------------------|------------------------------|
//! | assets   | `assets/`     | every file                               | `<out>/assets/<rel>`         |
//! | content  | `subjects/`   | every non-Markdown file, minus excludes  | `<out>/subjects/<rel>`       |
//! | index    | `README.md`   | exactly that file                        | `<out>/index.html`           |
//! | slides   | `subjects/`   | every `*.md`, minus `node_modules`       | `<out>/subjects/<planned>`   |
//!
//! A file is selected by at most one target: the readme belongs to the
//! index, and when one tree is nested in the other the deeper tree wins.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;

use crate::config::SiteConfig;
use crate::utils::path::to_slash;

/// Files that are never part of a build.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Slides skip dependency folders even when the content excludes are changed.
const SLIDES_EXCLUDE: &str = "**/node_modules/**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildTarget {
    Assets,
    Content,
    Index,
    Slides,
}

impl BuildTarget {
    pub const ALL: [Self; 4] = [Self::Assets, Self::Content, Self::Index, Self::Slides];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Content => "content",
            Self::Index => "index",
            Self::Slides => "slides",
        }
    }

    /// Step name in the composite build.
    pub const fn step_name(self) -> &'static str {
        match self {
            Self::Assets => "build-assets",
            Self::Content => "build-content",
            Self::Index => "build-index",
            Self::Slides => "build-slides",
        }
    }

    /// Fails on an exclusion glob that does not compile.
    pub fn selector(self, config: &SiteConfig) -> Result<Selector> {
        let build = &config.build;
        let mut skip = vec![
            build.output.clone(),
            config.pdf.output.clone(),
            config.pdf.staging.clone(),
        ];

        let (base, matcher, exclude) = match self {
            Self::Assets => {
                skip.push(build.readme.clone());
                if build.content.starts_with(&build.assets) {
                    skip.push(build.content.clone());
                }
                (build.assets.clone(), Matcher::Any, Vec::new())
            }
            Self::Content | Self::Slides => {
                skip.push(build.readme.clone());
                if build.assets.starts_with(&build.content) {
                    skip.push(build.assets.clone());
                }
                if self == Self::Content {
                    (build.content.clone(), Matcher::NotMarkdown, build.exclude.clone())
                } else {
                    (build.content.clone(), Matcher::Markdown, vec![SLIDES_EXCLUDE.to_string()])
                }
            }
            Self::Index => (build.readme.clone(), Matcher::Exact, Vec::new()),
        };

        let exclude = exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p)
                    .with_context(|| format!("invalid {} exclude pattern `{p}`", self.name()))
            })
            .collect::<Result<_>>()?;

        Ok(Selector {
            base,
            matcher,
            exclude,
            skip,
        })
    }
}

/// The selectors of all targets, compiled once per build context.
#[derive(Debug, Clone)]
pub struct Selectors([Selector; 4]);

impl Selectors {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let [assets, content, index, slides] = BuildTarget::ALL;
        Ok(Self([
            assets.selector(config)?,
            content.selector(config)?,
            index.selector(config)?,
            slides.selector(config)?,
        ]))
    }

    pub fn get(&self, target: BuildTarget) -> &Selector {
        &self.0[target as usize]
    }

    /// The target that selects `path`, if any.
    pub fn owning(&self, path: &Path) -> Option<BuildTarget> {
        BuildTarget::ALL
            .into_iter()
            .find(|&target| self.get(target).matches(path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Matcher {
    Any,
    Markdown,
    NotMarkdown,
    /// The base path itself.
    Exact,
}

/// Base directory, file matcher and exclusion globs of one target.
#[derive(Debug, Clone)]
pub struct Selector {
    base: PathBuf,
    matcher: Matcher,
    /// Matched against the path relative to `base`.
    exclude: Vec<glob::Pattern>,
    /// Paths owned by another target or by the build itself.
    skip: Vec<PathBuf>,
}

impl Selector {
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether `path` (absolute) belongs to this target. Does not check that
    /// the file exists, so removed files are still routed.
    pub fn matches(&self, path: &Path) -> bool {
        if self.matcher == Matcher::Exact {
            return path == self.base;
        }

        let Ok(rel) = path.strip_prefix(&self.base) else {
            return false;
        };
        if rel.as_os_str().is_empty() || self.skip.iter().any(|s| path.starts_with(s)) {
            return false;
        }
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| IGNORED_FILES.contains(&n))
        {
            return false;
        }

        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        let kind_ok = match self.matcher {
            Matcher::Any | Matcher::Exact => true,
            Matcher::Markdown => is_markdown,
            Matcher::NotMarkdown => !is_markdown,
        };

        kind_ok && {
            let rel = to_slash(rel);
            !self.exclude.iter().any(|pattern| pattern.matches(&rel))
        }
    }

    /// Every existing file this target selects.
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.matcher == Matcher::Exact {
            return vec![self.base.clone()];
        }
        if !self.base.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.base)
            .skip_hidden(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| self.matches(path))
            .collect();
        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{test_config, test_site};
    use std::collections::HashSet;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn rels(config: &SiteConfig, target: BuildTarget) -> Vec<String> {
        target
            .selector(config)
            .unwrap()
            .collect()
            .iter()
            .map(|p| to_slash(p.strip_prefix(&config.root).unwrap()))
            .collect()
    }

    #[test]
    fn test_selectors() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        for rel in [
            "subjects/js/INSTALL.md",
            "subjects/js/images/flow.png",
            "subjects/js/diagram.odg",
            "subjects/js/node_modules/pkg/README.md",
            "subjects/js/node_modules/pkg/index.js",
            "subjects/.DS_Store",
            "assets/css/slides.css",
            "build/subjects/js/index.html",
        ] {
            touch(dir.path(), rel);
        }
        let config = test_config(dir.path());

        assert_eq!(rels(&config, BuildTarget::Assets), ["assets/css/slides.css"]);
        assert_eq!(
            rels(&config, BuildTarget::Content),
            ["subjects/js/images/flow.png"]
        );
        assert_eq!(rels(&config, BuildTarget::Index), ["README.md"]);
        assert_eq!(
            rels(&config, BuildTarget::Slides),
            ["subjects/js/INSTALL.md", "subjects/js/README.md"]
        );
    }

    #[test]
    fn test_targets_disjoint_with_nested_trees() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        fs::write(
            dir.path().join("slidesmith.toml"),
            "[build]\ncontent = \".\"\nassets = \"static\"\nexclude = []",
        )
        .unwrap();
        for rel in ["static/logo.png", "static/notes.md", "subjects/js/a.txt"] {
            touch(dir.path(), rel);
        }
        let config = test_config(dir.path());
        let selectors = Selectors::new(&config).unwrap();

        let mut seen = HashSet::new();
        for target in BuildTarget::ALL {
            for path in selectors.get(target).collect() {
                assert!(seen.insert(path.clone()), "{} selected twice", path.display());
                assert_eq!(selectors.owning(&path), Some(target));
            }
        }
        assert!(seen.contains(&config.root.join("static/notes.md")));
        assert!(seen.contains(&config.root.join("subjects/js/README.md")));
        // The main readme still belongs to the index.
        assert_eq!(
            selectors.owning(&config.root.join("README.md")),
            Some(BuildTarget::Index)
        );
    }

    #[test]
    fn test_owning_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        let config = test_config(dir.path());
        let selectors = Selectors::new(&config).unwrap();

        let gone = config.build.content.join("js/GONE.md");
        assert_eq!(selectors.owning(&gone), Some(BuildTarget::Slides));
        assert_eq!(
            selectors.owning(&config.root.join("templates/remark.html")),
            None
        );
    }

    #[test]
    fn test_invalid_exclude_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        test_site(dir.path());
        touch(dir.path(), "subjects/js/diagram.odg");
        let mut config = test_config(dir.path());
        config.build.exclude = vec!["**/*.odg".to_string(), "[".to_string()];

        let err = BuildTarget::Content.selector(&config).unwrap_err();
        assert!(format!("{err:#}").contains("invalid content exclude pattern `[`"));
        assert!(Selectors::new(&config).is_err());
        // Slides do not use the content excludes.
        assert!(BuildTarget::Slides.selector(&config).is_ok());
    }
}
