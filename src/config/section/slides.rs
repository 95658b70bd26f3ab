//! `[slides]` section configuration.
//!
//! ```toml
//! [slides]
//! fallback_title = "Slides"         # deck without a level-1 heading
//! breadcrumbs = true                # `.breadcrumbs[A > B]` on sub-slides
//! highlight_lines = true            # remark options
//! highlight_spans = true
//! count_incremental_slides = false
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidesConfig {
    pub fallback_title: String,
    pub breadcrumbs: bool,
    pub highlight_lines: bool,
    pub highlight_spans: bool,
    pub count_incremental_slides: bool,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            fallback_title: "Slides".to_string(),
            breadcrumbs: true,
            highlight_lines: true,
            highlight_spans: true,
            count_incremental_slides: false,
        }
    }
}

impl SlidesConfig {
    /// Options object handed to `remark.create()` in the slide template.
    pub fn remark_options(&self) -> serde_json::Value {
        serde_json::json!({
            "highlightLines": self.highlight_lines,
            "highlightSpans": self.highlight_spans,
            "countIncrementalSlides": self.count_incremental_slides,
        })
    }
}
