//! Slide deck pages.

use std::borrow::Cow;

use serde::Serialize;

use super::remark::{self, RemarkOptions};
use super::title::{deck_title, page_title};
use super::{RenderedPage, TemplateError, TemplateSnapshot};
use crate::config::{SiteConfig, SiteInfoConfig};
use crate::page::{SlidePlan, rewrite_relative_links};

/// Variables available to the slide template.
#[derive(Debug, Serialize)]
struct SlideContext<'a> {
    /// Relative path from the deck to the build root, without trailing `/`.
    base_path: String,
    /// remark.js slide markup.
    source: &'a str,
    title: String,
    webfonts: bool,
    remark: serde_json::Value,
    site: &'a SiteInfoConfig,
}

/// Render one deck. `markdown` is the document exactly as read from disk.
pub fn render_slides(
    plan: &SlidePlan,
    markdown: &str,
    template: &TemplateSnapshot,
    config: &SiteConfig,
) -> Result<RenderedPage, TemplateError> {
    let markdown = if plan.kind.moves_down() {
        rewrite_relative_links(markdown)
    } else {
        Cow::Borrowed(markdown)
    };

    let title = deck_title(&markdown, &config.slides.fallback_title);
    let source = remark::to_slides(
        &markdown,
        RemarkOptions {
            breadcrumbs: config.slides.breadcrumbs,
        },
    );

    let html = template.render(SlideContext {
        base_path: plan.base_path(),
        source: &source,
        title: page_title(&title, &config.site.title),
        webfonts: config.build.webfonts,
        remark: config.slides.remark_options(),
        site: &config.site,
    })?;

    Ok(RenderedPage {
        source: config.build.content.join(&plan.source),
        dest: config.content_output_dir().join(&plan.dest),
        bytes: html.into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::plan_slide;
    use crate::render::TemplateHandle;
    use std::fs;
    use std::path::Path;

    const TEMPLATE: &str = "{{ title }}|{{ base_path|tojson }}|{{ webfonts|tojson }}|{{ remark|tojson }}|{{ site.title }}\n{{ source|safe }}";

    fn setup() -> (tempfile::TempDir, SiteConfig, TemplateHandle) {
        let dir = tempfile::tempdir().unwrap();
        crate::config::test_site(dir.path());
        let config = crate::config::test_config(dir.path());
        let path = dir.path().join("templates/remark.html");
        fs::write(&path, TEMPLATE).unwrap();
        let handle = TemplateHandle::load(&path).unwrap();
        (dir, config, handle)
    }

    fn render(config: &SiteConfig, handle: &TemplateHandle, rel: &str, md: &str) -> String {
        let plan = plan_slide(&config.build.content, &config.build.content.join(rel)).unwrap();
        let page = render_slides(&plan, md, &handle.snapshot(), config).unwrap();
        String::from_utf8(page.bytes).unwrap()
    }

    #[test]
    fn test_readme_deck() {
        let (_dir, config, handle) = setup();
        let html = render(&config, &handle, "js/README.md", "# JavaScript\n\n[next](../git/)\n");

        let head = html.lines().next().unwrap();
        assert!(head.starts_with("JavaScript (Course)|\"../..\"|true|"), "{head}");
        assert!(head.contains("\"highlightLines\":true"));
        assert!(head.ends_with("|Course"));
        // README documents keep their links.
        assert!(html.contains("[next](../git/)"));
        assert!(html.contains("class: center, middle"));
    }

    #[test]
    fn test_demo_template_renders() {
        let (dir, config, _) = setup();
        let path = dir.path().join("templates/demo.html");
        fs::write(&path, include_str!("../../demos/site/templates/remark.html")).unwrap();
        let handle = TemplateHandle::load(&path).unwrap();

        let html = render(&config, &handle, "js/README.md", "# Tips & Tricks\n\n<kbd>q</kbd>\n");
        assert!(html.contains("<title>Tips &amp; Tricks (Course)</title>"), "{html}");
        assert!(html.contains("course.css"));
        assert!(html.contains("remark.create({"), "{html}");
        assert!(html.contains(r#""highlightLines":true"#));
        // The deck source is escaped inside the textarea.
        assert!(html.contains("&lt;kbd&gt;q"));
        assert!(!html.contains("<kbd>"));
    }

    #[test]
    fn test_named_doc_links_rewritten_once() {
        let (_dir, config, handle) = setup();
        let html = render(&config, &handle, "js/INSTALL.md", "# Install\n\n[back](../README.md)\n");

        assert!(html.starts_with("Install (Course)|\"../../..\"|"));
        assert!(html.contains("[back](../../README.md)"));
        assert!(!html.contains("../../../README.md"));
    }

    #[test]
    fn test_fallback_title() {
        let (_dir, config, handle) = setup();
        let html = render(&config, &handle, "js/notes.md", "## Only a subtitle\n");
        assert!(html.starts_with("Slides (Course)|"));
    }

    #[test]
    fn test_page_paths() {
        let (_dir, config, handle) = setup();
        let plan = plan_slide(
            &config.build.content,
            &config.build.content.join("js/INSTALL.md"),
        )
        .unwrap();
        let page = render_slides(&plan, "# Install\n", &handle.snapshot(), &config).unwrap();

        assert_eq!(page.source, config.build.content.join("js/INSTALL.md"));
        assert_eq!(
            page.dest,
            config.build.output.join("subjects/js/install/index.html")
        );
        assert!(page.dest.starts_with(Path::new(&config.build.output)));
    }
}
