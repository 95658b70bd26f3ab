//! Static resources compiled into the binary.
//!
//! - `serve` - dev server resources (livereload.js, loading page)

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the injected `<script>` tag loads the client from.
    pub const LIVERELOAD_URL: &str = "/__slidesmith/livereload.js";

    /// Variables for livereload.js.
    pub struct LiveReloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LiveReloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__SLIDESMITH_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Browser side of live reload.
    pub const LIVERELOAD_JS: Template<LiveReloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    /// Variables for loading.html.
    pub struct LoadingVars<'a> {
        pub title: &'a str,
    }

    impl TemplateVars for LoadingVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__TITLE__", &escape_html(self.title))
        }
    }

    /// Shown while the initial build runs; reloads itself.
    pub const LOADING_HTML: Template<LoadingVars<'static>> =
        Template::new(include_str!("serve/loading.html"));

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_livereload_port_injected() {
            let js = LIVERELOAD_JS.render(&LiveReloadVars { ws_port: 35730 });
            assert!(js.contains("35730"));
            assert!(!js.contains("__SLIDESMITH_WS_PORT__"));
        }

        #[test]
        fn test_loading_title_escaped() {
            let html = LOADING_HTML.render(&LoadingVars {
                title: "Web <Dev>",
            });
            assert!(html.contains("Web &lt;Dev&gt;"));
        }
    }
}
