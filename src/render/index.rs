//! The course index page, rendered from the main readme.

use serde::Serialize;

use super::markdown::{self, MarkdownOptions};
use super::title::first_heading;
use super::{RenderedPage, TemplateError, TemplateSnapshot};
use crate::config::{SiteConfig, SiteInfoConfig};

#[derive(Debug, Serialize)]
struct IndexContext<'a> {
    /// The readme as HTML. Templates output it with `|safe`.
    contents: String,
    title: String,
    webfonts: bool,
    site: &'a SiteInfoConfig,
}

pub fn render_index(
    markdown: &str,
    template: &TemplateSnapshot,
    config: &SiteConfig,
) -> Result<RenderedPage, TemplateError> {
    let html = template.render(IndexContext {
        contents: markdown::to_html(markdown, &MarkdownOptions::github()),
        title: first_heading(markdown).unwrap_or_else(|| config.site.title.clone()),
        webfonts: config.build.webfonts,
        site: &config.site,
    })?;

    Ok(RenderedPage {
        source: config.build.readme.clone(),
        dest: config.build.output.join("index.html"),
        bytes: html.into_bytes(),
    })
}
