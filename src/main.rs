//! Slidesmith - remark.js slide decks from a tree of Markdown course material.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod page;
mod pdf;
mod pipeline;
mod reload;
mod render;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;
use pipeline::BuildContext;

fn main() -> Result<()> {
    // Before anything that blocks
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => {
            cli::build::build_site(&BuildContext::new(config)?).map(|_| ())
        }
        Commands::Clean => cli::build::clean_site(&config),
        Commands::Serve { .. } => cli::serve::serve_site(BuildContext::new(config)?),
        Commands::Watch => cli::build::watch_site(BuildContext::new(config)?),
        Commands::Pdf { .. } => cli::pdf::export_pdfs(&config),
        Commands::Publish => cli::publish::publish_site(&BuildContext::new(config)?),
        Commands::Doctoc => cli::doctoc::update_tocs(&config),
    }
}
