use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet period after the last event before a batch is released.
pub(super) const DEBOUNCE_MS: u64 = 300;
/// Minimum gap between two released batches.
pub(super) const BATCH_COOLDOWN_MS: u64 = 800;

/// Folds raw notify events into one change per path and decides when a
/// batch is ready. Knows nothing about the site.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_batch: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_batch: None,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // chmod/touch noise would rebuild forever
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);
            if self.fold(path, kind) {
                self.last_event = Some(Instant::now());
            }
        }
    }

    /// Merge `kind` into the pending change of `path`. Returns whether
    /// anything was recorded.
    fn fold(&mut self, path: PathBuf, kind: ChangeKind) -> bool {
        let Some(&pending) = self.changes.get(&path) else {
            crate::debug!("watch"; "{}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
            return true;
        };

        match (pending, kind) {
            // deleted then restored (atomic save)
            (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                self.changes.insert(path, kind);
            }
            (ChangeKind::Modified, ChangeKind::Removed) => {
                self.changes.insert(path, ChangeKind::Removed);
            }
            // appeared and vanished inside one window
            (ChangeKind::Created, ChangeKind::Removed) => {
                crate::debug!("watch"; "discard created+removed: {}", path.display());
                self.changes.remove(&path);
            }
            _ => return false,
        }
        true
    }

    /// Take the pending batch once the quiet period and the cooldown have
    /// both elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        if changes.is_empty() {
            return None;
        }
        self.last_batch = Some(Instant::now());
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }
        if self
            .last_batch
            .is_some_and(|t| t.elapsed() < Duration::from_millis(BATCH_COOLDOWN_MS))
        {
            return false;
        }
        !self.changes.is_empty()
    }

    /// How long the event loop may sleep before the batch can be ready.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let quiet = Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());
        let cooldown = self.last_batch.map_or(Duration::ZERO, |t| {
            Duration::from_millis(BATCH_COOLDOWN_MS).saturating_sub(t.elapsed())
        });

        quiet.max(cooldown).max(Duration::from_millis(1))
    }
}

/// Editor swap, backup and lock files.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bak" | "backup" | "swp" | "swo" | "swx" | "tmp" | "part")
        || name.ends_with('~')
        || name.ends_with('#')
        || name.starts_with(".#")
        || name == "4913"
        || name == ".DS_Store"
}
