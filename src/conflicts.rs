use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::change::Change;

/// Returns every path that is simultaneously the source of one change and
/// the destination of a rename. Applying such a set in either order could
/// destroy data, and whether that is intended (say, a swap) is knowledge
/// only the external command has, so a non-empty result must block the
/// apply phase outright. A `BTreeSet` keeps the report deterministic.
pub fn detect_conflicts(changes: &[Change]) -> BTreeSet<PathBuf> {
    let mut sources = BTreeSet::new();
    let mut destinations = BTreeSet::new();
    for change in changes {
        match change {
            Change::Content(c) => {
                sources.insert(c.path.clone());
            }
            Change::Rename(r) => {
                sources.insert(r.old.clone());
                destinations.insert(r.new.clone());
            }
        }
    }
    sources.intersection(&destinations).cloned().collect()
}
