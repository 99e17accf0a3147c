//! Core engine for full-apply: walk a set of paths, pipe every file's
//! contents and every path string through an external shell command, collect
//! the proposed changes, detect conflicts between them, and apply the
//! approved ones to the filesystem. The binary in main.rs is a thin CLI
//! over this.

pub mod binary;
pub mod change;
pub mod collect;
pub mod conflicts;
pub mod error;
pub mod exec;
pub mod render;

pub use change::{ApplyOutcome, Change, ContentChange, RenameChange};
pub use collect::{CollectOptions, collect_changes};
pub use conflicts::detect_conflicts;
pub use error::Error;
pub use exec::{ShellTransform, Transform, TransformOutput};
