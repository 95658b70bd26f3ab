//! Configuration section definitions.
//!
//! Each module corresponds to a section in `slidesmith.toml`:
//!
//! | Module      | TOML Section    | Purpose                               |
//! |-------------|-----------------|---------------------------------------|
//! | `build`     | `[build]`       | Source trees, output dir, exclusions  |
//! | `pdf`       | `[pdf]`         | PDF export                            |
//! | `publish`   | `[publish]`     | Git branch publishing                 |
//! | `serve`     | `[serve]`       | Development server                    |
//! | `site`      | `[site]`        | Course metadata                       |
//! | `slides`    | `[slides]`      | Slide conversion and remark options   |
//! | `templates` | `[templates]`   | Page template paths                   |

mod build;
mod pdf;
mod publish;
mod serve;
mod site;
mod slides;
mod templates;

pub use build::BuildSectionConfig;
pub use pdf::PdfConfig;
pub use publish::PublishConfig;
pub use serve::ServeConfig;
pub use site::SiteInfoConfig;
pub use slides::SlidesConfig;
pub use templates::TemplatesConfig;
