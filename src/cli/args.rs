//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::{net::IpAddr, path::PathBuf};

/// Build remark.js slide decks from a tree of Markdown course material
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (searched upward from the current directory)
    #[arg(short = 'C', long, default_value = "slidesmith.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build assets, content, index and slides once
    #[command(visible_alias = "b")]
    Build {
        /// Remove the output directory before building
        #[arg(short, long)]
        clean: bool,
    },

    /// Remove the output and PDF staging directories
    Clean,

    /// Build, then serve the output with live reload
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },

    /// Build, then rebuild on every change (no HTTP server)
    #[command(visible_alias = "w")]
    Watch,

    /// Build into the staging directory and print every deck to PDF
    Pdf {
        /// Number of decks printed concurrently
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Build and force-push the output to the publish branch
    Publish,

    /// Regenerate the doctoc tables of contents in the slide sources
    Doctoc,
}

/// Dev server arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Remove the output directory before the initial build
    #[arg(short, long)]
    pub clean: bool,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Websocket port of the live-reload server
    #[arg(long)]
    pub livereload_port: Option<u16>,

    /// Do not open a browser once the server is up
    #[arg(long)]
    pub no_open: bool,

    /// Serve the initial build without watching for changes
    #[arg(long)]
    pub no_watch: bool,
}
