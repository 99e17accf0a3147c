use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Everything that can abort a collection or apply pass.
///
/// The only locally-recovered condition (renaming a directory) is not an
/// error at all; see [`crate::change::ApplyOutcome`].
#[derive(Debug, Error)]
pub enum Error {
    /// The external transform command exited non-zero. Fatal to the whole
    /// run: a partially-applied transform set is unsafe to reason about, so
    /// nothing is retried and no partial change set is returned.
    #[error("transform command `{command}` exited with {status}")]
    TransformFailed {
        command: String,
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    /// A rename destination is occupied and we were not allowed to replace
    /// it, or it appeared between collection and apply.
    #[error("{}", destination_exists_message(.path, .overwrite))]
    DestinationExists { path: PathBuf, overwrite: bool },

    /// The transform produced a path that is not valid UTF-8. A path that
    /// cannot be represented as text cannot be applied.
    #[error("transformed path is not valid UTF-8: {0}")]
    PathEncoding(#[from] FromUtf8Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn destination_exists_message(path: &PathBuf, overwrite: &bool) -> String {
    let reason = if *overwrite {
        ", but it did not exist when changes were collected"
    } else {
        " and --overwrite was not given"
    };
    format!("destination {} already exists{}", path.display(), reason)
}
