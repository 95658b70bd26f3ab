use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// A directory to watch and how deep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRoot {
    pub path: PathBuf,
    pub mode: RecursiveMode,
}

impl WatchRoot {
    pub fn recursive(path: PathBuf) -> Self {
        Self {
            path,
            mode: RecursiveMode::Recursive,
        }
    }

    pub fn shallow(path: PathBuf) -> Self {
        Self {
            path,
            mode: RecursiveMode::NonRecursive,
        }
    }
}

/// Keeps every desired root attached, re-attaching roots that were
/// deleted and created again while watching.
pub(super) struct WatchRoots {
    desired: Vec<WatchRoot>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(roots: Vec<WatchRoot>) -> Self {
        Self {
            desired: roots,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> notify::Result<()> {
        for root in &self.desired {
            if !root.path.exists() {
                crate::debug!("watch"; "not watching missing {}", root.path.display());
                continue;
            }
            watcher.watch(&root.path, root.mode)?;
            self.attached.insert(root.path.clone());
        }
        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        self.attached.retain(|path| path.exists());

        for root in &self.desired {
            if self.attached.contains(&root.path) || !root.path.exists() {
                continue;
            }
            if watcher.watch(&root.path, root.mode).is_ok() {
                self.attached.insert(root.path.clone());
                crate::debug!("watch"; "re-attached watch: {}", root.path.display());
            }
        }
    }
}
