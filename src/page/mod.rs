//! Source pages: what a Markdown file is and where its deck goes.
//!
//! - [`kind`]: logical kind of a source file
//! - [`plan`]: source path → destination `index.html` + depth
//! - [`links`]: upward-relative link fix-up for documents that move down a level

mod kind;
mod links;
mod plan;

pub use kind::SourceKind;
pub use links::rewrite_relative_links;
pub use plan::{SlidePlan, plan_slide};
