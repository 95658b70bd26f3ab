use std::path::PathBuf;

use crate::actor::fs::WatchRoot;
use crate::config::SiteConfig;

/// What the watcher listens to: the content and assets trees recursively,
/// and the directories holding the readme and the templates one level deep.
pub(super) fn collect_watch_roots(config: &SiteConfig) -> Vec<WatchRoot> {
    let trees = outermost(vec![config.build.content.clone(), config.build.assets.clone()]);

    let mut shallow: Vec<PathBuf> = Vec::new();
    for file in [
        &config.build.readme,
        &config.templates.index,
        &config.templates.slides,
    ] {
        let Some(dir) = file.parent() else { continue };
        if trees.iter().any(|tree| dir.starts_with(tree)) || shallow.iter().any(|d| d == dir) {
            continue;
        }
        shallow.push(dir.to_path_buf());
    }

    trees
        .into_iter()
        .map(WatchRoot::recursive)
        .chain(shallow.into_iter().map(WatchRoot::shallow))
        .collect()
}

/// Drop directories nested in another one of the list.
fn outermost(mut dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    dirs.sort();
    dirs.dedup();
    let mut kept: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        if !kept.iter().any(|outer: &PathBuf| dir.starts_with(outer)) {
            kept.push(dir);
        }
    }
    kept
}
