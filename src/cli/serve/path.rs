//! URL to filesystem path resolution.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    /// A directory requested without its trailing slash. Relative links in
    /// its index page only work from the slash form.
    Redirect(String),
}

/// Map a request URL to a file under `serve_root`, serving `index.html`
/// for directories.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<Resolved> {
    let path = url_path(url);
    let rel = path.trim_matches('/');
    if Path::new(rel)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return None;
    }

    // Symlinks must not lead out of the root either.
    let canonical = serve_root.join(rel).canonicalize().ok()?;
    let root = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root) {
        return None;
    }

    if canonical.is_file() {
        return Some(Resolved::File(canonical));
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if !index.is_file() {
            return None;
        }
        if !path.ends_with('/') {
            return Some(Resolved::Redirect(redirect_target(url)));
        }
        return Some(Resolved::File(index));
    }
    None
}

/// Decoded path part of a URL.
fn url_path(url: &str) -> String {
    let raw = url.split(['?', '#']).next().unwrap_or(url);
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_default()
}

/// `url` with a slash after its path, query kept.
fn redirect_target(url: &str) -> String {
    match url.split_once('?') {
        Some((path, query)) => format!("{path}/?{query}"),
        None => format!("{url}/"),
    }
}
