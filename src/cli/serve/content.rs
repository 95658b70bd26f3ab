//! Live reload script injection.

use crate::embed::serve::LIVERELOAD_URL;
use crate::utils::mime::is_html;

const BODY_END: &[u8] = b"</body>";

/// Add the live reload `<script>` to HTML responses when reload is on.
pub fn maybe_inject_livereload(
    body: Vec<u8>,
    content_type: &str,
    ws_port: Option<u16>,
) -> Vec<u8> {
    match ws_port {
        Some(_) if is_html(content_type) => inject_script(&body),
        _ => body,
    }
}

/// Insert before the last `</body>`, in any case, or append.
fn inject_script(content: &[u8]) -> Vec<u8> {
    let tag = format!(r#"<script src="{LIVERELOAD_URL}"></script>"#);
    let pos = content
        .windows(BODY_END.len())
        .rposition(|w| w.eq_ignore_ascii_case(BODY_END))
        .unwrap_or(content.len());

    let mut out = Vec::with_capacity(content.len() + tag.len());
    out.extend_from_slice(&content[..pos]);
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(&content[pos..]);
    out
}
