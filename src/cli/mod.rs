//! Command-line interface module.

mod args;
pub mod build;
pub mod doctoc;
pub mod pdf;
pub mod publish;
pub mod serve;

pub use args::{Cli, Commands, ServeArgs};
