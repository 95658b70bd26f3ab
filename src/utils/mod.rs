//! Small helpers shared across the crate.

pub mod exec;
pub mod hash;
pub mod mime;
pub mod path;
pub mod plural;
