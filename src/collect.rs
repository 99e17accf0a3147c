use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::change::{Change, ContentChange, RenameChange};
use crate::error::Error;
use crate::exec::Transform;

/// Flags controlling one collection pass.
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Process entries whose final path component starts with a dot.
    pub hidden: bool,
    /// Pipe binary-looking file contents through the transform too.
    pub binary: bool,
    /// Descend into directories.
    pub recursive: bool,
    /// Propose renames for transformed path strings.
    pub rename: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self { hidden: false, binary: false, recursive: false, rename: true }
    }
}

/// The binary-file oracle the collector consumes. Injected so tests (and
/// callers with their own heuristics) are not tied to ours.
pub type BinaryCheck<'a> = &'a dyn Fn(&Path) -> io::Result<bool>;

/// Walks `paths` depth-first and returns every change the transform
/// proposes, in traversal order. The whole pass aborts on the first
/// transform failure; no partial change set is returned.
pub fn collect_changes(
    transform: &dyn Transform,
    paths: &[PathBuf],
    opts: &CollectOptions,
    is_binary: BinaryCheck,
) -> Result<Vec<Change>, Error> {
    let mut processed = HashSet::new();
    let mut changes = Vec::new();
    collect_into(transform, paths, opts, is_binary, &mut processed, &mut changes)?;
    Ok(changes)
}

/// The recursive walk. `processed` is threaded through every level so a path
/// reachable both directly (as an argument) and transitively (under another
/// argument) is transformed at most once.
fn collect_into(
    transform: &dyn Transform,
    paths: &[PathBuf],
    opts: &CollectOptions,
    is_binary: BinaryCheck,
    processed: &mut HashSet<PathBuf>,
    changes: &mut Vec<Change>,
) -> Result<(), Error> {
    for path in paths {
        if processed.contains(path) || (is_hidden(path) && !opts.hidden) {
            continue;
        }
        collect_for_path(transform, path, opts, is_binary, changes)?;
        if path.is_dir() && !is_symlink(path) {
            if opts.recursive {
                let children = fs::read_dir(path)?
                    .map(|entry| entry.map(|e| e.path()))
                    .collect::<io::Result<Vec<_>>>()?;
                collect_into(transform, &children, opts, is_binary, processed, changes)?;
            } else if let Some(Change::Rename(r)) = changes.last_mut() {
                // The directory's own rename proposal stands, but nothing
                // inside it was examined; let the reviewer know.
                if r.old == *path {
                    r.recursion_skipped = true;
                }
            }
        }
        processed.insert(path.clone());
    }
    Ok(())
}

/// Content and rename transforms are independent and never short-circuit
/// each other: one file can collect both in a single pass.
fn collect_for_path(
    transform: &dyn Transform,
    path: &Path,
    opts: &CollectOptions,
    is_binary: BinaryCheck,
    changes: &mut Vec<Change>,
) -> Result<(), Error> {
    if path.is_file() && (opts.binary || !is_binary(path)?) {
        let old = fs::read(path)?;
        let out = transform.run(&old)?;
        if out.stdout != old {
            changes.push(Change::Content(ContentChange {
                path: path.to_path_buf(),
                old,
                new: out.stdout,
                transform_stderr: out.stderr,
            }));
        }
    }
    if opts.rename {
        // Paths that are not valid UTF-8 cannot be piped as text, so no
        // rename is proposed for them; their contents are still handled.
        if let Some(path_str) = path.to_str() {
            let out = transform.run(path_str.as_bytes())?;
            let new_str = String::from_utf8(out.stdout)?;
            if new_str != path_str {
                let new_path = PathBuf::from(new_str);
                changes.push(Change::Rename(RenameChange {
                    old: path.to_path_buf(),
                    dest_exists: new_path.exists(),
                    new: new_path,
                    old_is_dir: path.is_dir(),
                    recursion_skipped: false,
                    transform_stderr: out.stderr,
                }));
            }
        }
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Symlinked directories are never descended into, so cyclic links cannot
/// recurse forever. The link itself is still processed as whatever its
/// target reports.
fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}
