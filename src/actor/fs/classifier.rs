use std::path::PathBuf;

use jwalk::WalkDir;
use rustc_hash::FxHashMap;

use super::debouncer::is_temp_file;
use super::types::{ChangeKind, DebouncedEvents};
use crate::utils::path::normalize_path;

/// Turns a raw debounced batch into events that match the filesystem as it
/// is now.
///
/// Pipeline: correct_by_existence → expand_dirs
pub(super) struct EventClassifier;

impl EventClassifier {
    pub(super) fn classify(raw: FxHashMap<PathBuf, ChangeKind>) -> Option<DebouncedEvents> {
        let mut changes = raw;

        Self::correct_by_existence(&mut changes);
        Self::expand_dirs(&mut changes);

        if changes.is_empty() {
            return None;
        }
        let mut events: Vec<_> = changes.into_iter().collect();
        events.sort_by(|a, b| a.0.cmp(&b.0));
        Some(DebouncedEvents(events))
    }

    /// The watcher may report a created file that is already gone again, or
    /// a removal of a file an editor has just written back.
    pub(super) fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
        changes.retain(|path, kind| {
            let exists = path.exists();
            match *kind {
                ChangeKind::Created if !exists => {
                    crate::debug!("watch"; "discard created (gone): {}", path.display());
                    return false;
                }
                ChangeKind::Modified if !exists => *kind = ChangeKind::Removed,
                ChangeKind::Removed if exists => *kind = ChangeKind::Modified,
                _ => {}
            }
            true
        });
    }

    /// A directory moved or copied in arrives as a single event; replace it
    /// by the files below it. Removed directories stay as they are.
    pub(super) fn expand_dirs(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
        let dirs: Vec<PathBuf> = changes
            .iter()
            .filter(|(path, kind)| **kind != ChangeKind::Removed && path.is_dir())
            .map(|(path, _)| path.clone())
            .collect();

        for dir in dirs {
            let kind = changes.remove(&dir).unwrap_or(ChangeKind::Created);
            if kind == ChangeKind::Modified {
                // Entries changing inside a directory already have events of their own.
                continue;
            }
            let files = WalkDir::new(&dir)
                .skip_hidden(false)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| normalize_path(&e.path()))
                .filter(|p| !is_temp_file(p));
            for file in files {
                changes.entry(file).or_insert(ChangeKind::Created);
            }
        }
    }
}
