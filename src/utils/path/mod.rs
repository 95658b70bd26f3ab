//! Path utilities.
//!
//! - [`fs`]: normalization and resolution against the project root

pub mod fs;

pub use fs::{clean, normalize_path, resolve_path, to_slash};
