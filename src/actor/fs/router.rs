use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::types::DebouncedEvents;
use crate::actor::messages::Change;
use crate::pipeline::{BuildContext, BuildTarget};
use crate::render::TemplateKind;

/// Who is affected by a change to one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Owner {
    Target(BuildTarget),
    Template(TemplateKind),
}

/// Route a path to at most one owner. Templates win over targets so a
/// template kept inside the content tree is not copied as content.
pub(super) fn owner_of(path: &Path, ctx: &BuildContext) -> Option<Owner> {
    if let Some(kind) = ctx.templates.kind_of(path) {
        return Some(Owner::Template(kind));
    }
    ctx.selectors.owning(path).map(Owner::Target)
}

pub(super) fn log_events(events: &DebouncedEvents, ctx: &BuildContext) {
    for (path, kind) in &events.0 {
        crate::debug!("watch"; "{}: {}", kind.label(), ctx.display(path));
    }
}

/// Group classified events into changes for the build actor.
///
/// Removals come first so a rename drops the old output before the new one
/// is written; template changes come last.
pub(super) fn events_to_changes(events: DebouncedEvents, ctx: &BuildContext) -> Vec<Change> {
    let (changed, removed) = events.split();
    let mut templates: Vec<TemplateKind> = Vec::new();

    let mut group = |paths: Vec<PathBuf>| {
        let mut by_target: BTreeMap<BuildTarget, Vec<PathBuf>> = BTreeMap::new();
        for path in paths {
            match owner_of(&path, ctx) {
                Some(Owner::Target(target)) => by_target.entry(target).or_default().push(path),
                Some(Owner::Template(kind)) if !templates.contains(&kind) => templates.push(kind),
                Some(Owner::Template(_)) => {}
                None => crate::debug!("watch"; "ignored: {}", ctx.display(&path)),
            }
        }
        by_target
    };

    let removed = group(removed);
    let changed = group(changed);

    let mut changes = Vec::new();
    changes.extend(
        removed
            .into_iter()
            .map(|(target, paths)| Change::Remove { target, paths }),
    );
    changes.extend(
        changed
            .into_iter()
            .map(|(target, paths)| Change::Rebuild { target, paths }),
    );
    changes.extend(templates.into_iter().map(Change::Template));
    changes
}
