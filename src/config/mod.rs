//! Site configuration management for `slidesmith.toml`.
//!
//! # Layering
//!
//! Lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. `slidesmith.toml`, searched upward from the current directory
//! 3. `slidesmith.local.toml` next to it, deep-merged (not committed)
//! 4. environment: `BUILD_DIR`, `PDF_BUILD_DIR`, `PORT`, `LIVERELOAD_PORT`, `BROWSER`
//! 5. command-line flags
//!
//! # Sections
//!
//! | Section       | Purpose                                         |
//! |---------------|-------------------------------------------------|
//! | `[site]`      | Course title, version, repository URL           |
//! | `[build]`     | Source trees, output dir, exclusions, webfonts  |
//! | `[templates]` | Index and slide page templates                  |
//! | `[slides]`    | Fallback title, breadcrumbs, remark options     |
//! | `[serve]`     | Development server and live reload              |
//! | `[pdf]`       | PDF export                                      |
//! | `[publish]`   | Git branch publishing                           |

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, local_override_path, merge_tables};

pub use section::{
    BuildSectionConfig, PdfConfig, PublishConfig, ServeConfig, SiteInfoConfig, SlidesConfig,
    TemplatesConfig,
};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{
    cli::{Cli, Commands, ServeArgs},
    debug,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing slidesmith.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file, which may not exist (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub site: SiteInfoConfig,
    pub build: BuildSectionConfig,
    pub templates: TemplatesConfig,
    pub slides: SlidesConfig,
    pub serve: ServeConfig,
    pub pdf: PdfConfig,
    pub publish: PublishConfig,
}

impl SiteConfig {
    /// Load configuration for the given command line.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_in(cli, &cwd, |key| std::env::var(key).ok())
    }

    /// Load with an explicit working directory and environment lookup.
    pub fn load_in<F>(cli: &Cli, cwd: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match find_config_file(&cli.config, cwd) {
            Some(path) => {
                let (mut config, ignored) = Self::from_path(&path)?;
                if !ignored.is_empty() {
                    Self::print_unknown_fields_warning(&ignored, &path);
                }
                config.config_path = crate::utils::path::normalize_path(&path);
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        config.root = config
            .config_path
            .parent()
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);

        config.apply_env(env)?;
        config.apply_command_options(cli);
        config.normalize_paths();
        config.validate(&cli.command)?;

        Ok(config)
    }

    /// Read the config file and its local override, if present.
    ///
    /// Returns the parsed config plus the unknown fields of both files.
    fn from_path(path: &Path) -> Result<(Self, Vec<String>), ConfigError> {
        let mut table = Self::read_table(path)?;

        let local = local_override_path(path);
        if local.is_file() {
            debug!("config"; "merging {}", local.display());
            merge_tables(&mut table, Self::read_table(&local)?);
        }

        Self::from_table(table).map_err(|e| ConfigError::Toml(path.to_path_buf(), e))
    }

    fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        content
            .parse::<toml::Table>()
            .map_err(|e| ConfigError::Toml(path.to_path_buf(), e))
    }

    /// Deserialize a (merged) table, collecting any unknown fields.
    fn from_table(table: toml::Table) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let config = serde_ignored::deserialize(toml::Value::Table(table), |path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Parse TOML content, collecting any unknown fields.
    #[cfg(test)]
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        Self::from_table(content.parse::<toml::Table>()?)
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());

        let mut diag = ConfigDiagnostics::new();
        for field in fields {
            diag.warn(format!("unknown field `{field}` in {display_path}, ignoring"));
        }
        diag.print_warnings();
    }

    // ========================================================================
    // overrides
    // ========================================================================

    /// Apply environment overrides.
    pub fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = var("BUILD_DIR") {
            self.build.output = PathBuf::from(dir);
        }
        if let Some(dir) = var("PDF_BUILD_DIR") {
            self.pdf.output = PathBuf::from(dir);
        }
        if let Some(port) = var("PORT") {
            self.serve.port = Self::parse_port("PORT", &port)?;
        }
        if let Some(port) = var("LIVERELOAD_PORT") {
            self.serve.livereload_port = Self::parse_port("LIVERELOAD_PORT", &port)?;
        }
        if let Some(browser) = var("BROWSER") {
            self.serve.browser = Some(browser);
        }
        Ok(())
    }

    fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation(format!("{key}=`{value}` is not a port number")))
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { clean } => self.build.clean = *clean,
            Commands::Serve { args } => self.apply_serve_args(args),
            Commands::Pdf { jobs } => {
                Self::update_option(&mut self.pdf.concurrency, jobs.as_ref());
            }
            Commands::Clean | Commands::Watch | Commands::Publish | Commands::Doctoc => {}
        }
    }

    fn apply_serve_args(&mut self, args: &ServeArgs) {
        self.build.clean = args.clean;
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        Self::update_option(&mut self.serve.livereload_port, args.livereload_port.as_ref());
        if args.no_open {
            self.serve.open = false;
        }
        if args.no_watch {
            self.serve.watch = false;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // paths
    // ========================================================================

    /// Resolve every configured path against the root.
    fn normalize_paths(&mut self) {
        self.root = crate::utils::path::normalize_path(&self.root);
        let root = self.root.clone();

        self.build.normalize(&root);
        self.templates.normalize(&root);
        self.pdf.normalize(&root);
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Output directory mirroring a source tree: `<output>/<tree relative to root>`.
    ///
    /// A tree outside the root keeps only its last component.
    fn mirrored_output(&self, tree: &Path) -> PathBuf {
        let name = match tree.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => tree.file_name().map(PathBuf::from).unwrap_or_default(),
        };
        self.build.output.join(name)
    }

    /// Where rendered decks and copied content files go.
    pub fn content_output_dir(&self) -> PathBuf {
        self.mirrored_output(&self.build.content)
    }

    /// Where assets are copied.
    pub fn assets_output_dir(&self) -> PathBuf {
        self.mirrored_output(&self.build.assets)
    }

    /// Copy of this config that builds into the PDF staging directory.
    ///
    /// Webfonts are disabled so the headless browser never waits on the network.
    pub fn for_pdf_staging(&self) -> Self {
        let mut staged = self.clone();
        staged.build.output = self.pdf.staging.clone();
        staged.build.webfonts = false;
        staged.build.clean = false;
        staged
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration for the given command.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, command: &Commands) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if !matches!(command, Commands::Clean) {
            self.site.validate(&mut diag);
            self.build.validate(&mut diag);
        }
        if !matches!(command, Commands::Clean | Commands::Doctoc) {
            self.templates.validate(&mut diag);
        }
        self.validate_removable(command, &mut diag);

        match command {
            Commands::Serve { .. } => self.serve.validate(&mut diag),
            Commands::Pdf { .. } => self.pdf.validate(&mut diag),
            Commands::Publish => self.publish.validate(&mut diag),
            _ => {}
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    /// Directories the command removes wholesale must not hold any source.
    fn validate_removable(&self, command: &Commands, diag: &mut ConfigDiagnostics) {
        let pdf = matches!(command, Commands::Pdf { .. });
        let mut removed = vec![("build.output", &self.build.output)];
        if pdf || matches!(command, Commands::Clean) {
            removed.push(("pdf.staging", &self.pdf.staging));
        }
        if pdf {
            removed.push(("pdf.output", &self.pdf.output));
        }

        let sources = [
            &self.root,
            &self.build.content,
            &self.build.assets,
            &self.build.readme,
            &self.templates.index,
            &self.templates.slides,
        ];
        let trees = [&self.build.content, &self.build.assets];

        for (field, dir) in removed {
            if let Some(source) = sources.iter().find(|source| source.starts_with(dir)) {
                diag.error_with_hint(
                    field,
                    format!(
                        "refusing to remove {}, it contains {}",
                        dir.display(),
                        source.display()
                    ),
                    "point it at a directory of its own, such as `build` or `pdf`",
                );
            } else if let Some(tree) = trees.iter().find(|tree| dir.starts_with(tree)) {
                diag.error(
                    field,
                    format!("{} lies inside the source tree {}", dir.display(), tree.display()),
                );
            }
        }

        if pdf
            && (self.pdf.output.starts_with(&self.pdf.staging)
                || self.pdf.staging.starts_with(&self.pdf.output))
        {
            diag.error("pdf.staging", "must not overlap pdf.output");
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// A minimal course tree: readme, both templates, one deck.
#[cfg(test)]
pub fn test_site(dir: &Path) {
    fs::create_dir_all(dir.join("subjects/js")).unwrap();
    fs::create_dir_all(dir.join("templates")).unwrap();
    fs::write(dir.join("README.md"), "# Course\n\n* [JS](subjects/js/)\n").unwrap();
    fs::write(dir.join("subjects/js/README.md"), "# JavaScript\n").unwrap();
    fs::write(
        dir.join("templates/index.html"),
        "<html><body>{{ contents|safe }}</body></html>",
    )
    .unwrap();
    fs::write(
        dir.join("templates/remark.html"),
        "<html><head><title>{{ title }}</title></head><body><textarea>{{ source }}</textarea><script>var base = {{ base_path|tojson }};</script></body></html>",
    )
    .unwrap();
}

/// Build a loaded config for a test tree, with the default `build` command.
#[cfg(test)]
pub fn test_config(dir: &Path) -> SiteConfig {
    use clap::Parser;

    let cli = Cli::try_parse_from(["slidesmith", "build"]).unwrap();
    SiteConfig::load_in(&cli, dir, |_| None).unwrap()
}

// ============================================================================
// tests
// ============================================================================
