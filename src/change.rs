use std::fs;
use std::path::PathBuf;

use crate::error::Error;

/// A proposed, not-yet-applied mutation: either a file's bytes change or a
/// filesystem entry moves. The variant set is closed on purpose; everything
/// downstream (rendering, conflict detection, apply) matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Content(ContentChange),
    Rename(RenameChange),
}

/// "The bytes at `path` should become `new`." Only materialized when the
/// transform output actually differs; `path` itself never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub path: PathBuf,
    pub old: Vec<u8>,
    pub new: Vec<u8>,
    pub transform_stderr: Vec<u8>,
}

/// "The entry at `old` should move to `new`." `dest_exists` and `old_is_dir`
/// are snapshots taken at collection time. `recursion_skipped` is set only
/// on a directory's own rename proposal when the walk was non-recursive, to
/// signal that nothing inside it was examined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameChange {
    pub old: PathBuf,
    pub new: PathBuf,
    pub dest_exists: bool,
    pub old_is_dir: bool,
    pub recursion_skipped: bool,
    pub transform_stderr: Vec<u8>,
}

/// What applying a single change did. Renaming a directory is unsupported
/// and skipped without failing the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    SkippedDirectory,
}

impl Change {
    /// Performs the actual filesystem mutation for this change. Each apply
    /// is independent; nothing here depends on other changes having run,
    /// which the conflict check guarantees before apply is ever invoked.
    pub fn apply_to_fs(&self, overwrite: bool) -> Result<ApplyOutcome, Error> {
        match self {
            Change::Content(c) => {
                fs::write(&c.path, &c.new)?;
                Ok(ApplyOutcome::Applied)
            }
            Change::Rename(r) => r.apply_to_fs(overwrite),
        }
    }
}

impl RenameChange {
    fn apply_to_fs(&self, overwrite: bool) -> Result<ApplyOutcome, Error> {
        // Re-check against the live filesystem, not just the snapshot.
        if self.old_is_dir || self.old.is_dir() {
            return Ok(ApplyOutcome::SkippedDirectory);
        }
        if (self.dest_exists && overwrite) || !self.new.exists() {
            if let Some(parent) = self.new.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&self.old, &self.new)?;
            Ok(ApplyOutcome::Applied)
        } else {
            // Either overwrite was never requested, or the destination
            // appeared after collection. Both mean the filesystem no longer
            // matches what the user reviewed.
            Err(Error::DestinationExists { path: self.new.clone(), overwrite })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn rename(old: PathBuf, new: PathBuf, dest_exists: bool) -> Change {
        Change::Rename(RenameChange {
            old,
            new,
            dest_exists,
            old_is_dir: false,
            recursion_skipped: false,
            transform_stderr: Vec::new(),
        })
    }

    #[test]
    fn content_apply_overwrites_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"old text\n").unwrap();

        let change = Change::Content(ContentChange {
            path: path.clone(),
            old: b"old text\n".to_vec(),
            new: b"new text\n".to_vec(),
            transform_stderr: Vec::new(),
        });
        assert_eq!(change.apply_to_fs(false).unwrap(), ApplyOutcome::Applied);
        assert_eq!(fs::read(&path).unwrap(), b"new text\n");

        // Applying again is idempotent as long as the bytes still match.
        assert_eq!(change.apply_to_fs(false).unwrap(), ApplyOutcome::Applied);
        assert_eq!(fs::read(&path).unwrap(), b"new text\n");
    }

    #[test]
    fn rename_apply_moves_the_file() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("a.txt");
        let new = dir.path().join("b.txt");
        fs::write(&old, b"data").unwrap();

        let outcome = rename(old.clone(), new.clone(), false).apply_to_fs(false).unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert!(!old.exists());
        assert_eq!(fs::read(&new).unwrap(), b"data");
    }

    #[test]
    fn rename_apply_creates_missing_parents() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("a.txt");
        let new = dir.path().join("deep").join("nested").join("b.txt");
        fs::write(&old, b"data").unwrap();

        rename(old, new.clone(), false).apply_to_fs(false).unwrap();
        assert_eq!(fs::read(&new).unwrap(), b"data");
    }

    #[test]
    fn rename_refuses_occupied_destination_without_overwrite() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("a.txt");
        let new = dir.path().join("b.txt");
        fs::write(&old, b"source").unwrap();
        fs::write(&new, b"precious").unwrap();

        let err = rename(old.clone(), new.clone(), true).apply_to_fs(false).unwrap_err();
        assert!(matches!(err, Error::DestinationExists { overwrite: false, .. }));
        assert_eq!(fs::read(&old).unwrap(), b"source");
        assert_eq!(fs::read(&new).unwrap(), b"precious");
    }

    #[test]
    fn rename_replaces_destination_when_overwrite_was_requested() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("a.txt");
        let new = dir.path().join("b.txt");
        fs::write(&old, b"source").unwrap();
        fs::write(&new, b"doomed").unwrap();

        let outcome = rename(old.clone(), new.clone(), true).apply_to_fs(true).unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert!(!old.exists());
        assert_eq!(fs::read(&new).unwrap(), b"source");
    }

    #[test]
    fn rename_rejects_destination_that_appeared_after_collection() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("a.txt");
        let new = dir.path().join("b.txt");
        fs::write(&old, b"source").unwrap();
        // Snapshot said the destination was free, but it exists now.
        fs::write(&new, b"raced in").unwrap();

        let err = rename(old.clone(), new.clone(), false).apply_to_fs(true).unwrap_err();
        assert!(matches!(err, Error::DestinationExists { overwrite: true, .. }));
        assert!(old.exists());
    }

    #[test]
    fn directory_rename_is_skipped_not_failed() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("subdir");
        fs::create_dir(&old).unwrap();

        let change = Change::Rename(RenameChange {
            old: old.clone(),
            new: dir.path().join("renamed"),
            dest_exists: false,
            old_is_dir: true,
            recursion_skipped: false,
            transform_stderr: Vec::new(),
        });
        assert_eq!(change.apply_to_fs(false).unwrap(), ApplyOutcome::SkippedDirectory);
        assert!(old.is_dir());
    }

    #[test]
    fn directory_detected_live_even_with_stale_snapshot() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("subdir");
        fs::create_dir(&old).unwrap();

        let change = Change::Rename(RenameChange {
            old: old.clone(),
            new: dir.path().join("renamed"),
            dest_exists: false,
            old_is_dir: false,
            recursion_skipped: false,
            transform_stderr: Vec::new(),
        });
        assert_eq!(change.apply_to_fs(false).unwrap(), ApplyOutcome::SkippedDirectory);
        assert!(old.is_dir());
    }
}
