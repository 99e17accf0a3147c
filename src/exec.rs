use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use crate::error::Error;

/// Captured output of one successful transform invocation. `stderr` is kept
/// as a diagnostic note to show alongside the change it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// The external rewrite step, seen by the engine as a function from bytes to
/// bytes. Abstracted as a trait so tests can substitute a deterministic
/// implementation for a real subprocess.
pub trait Transform {
    fn run(&self, input: &[u8]) -> Result<TransformOutput, Error>;
}

/// Runs a user-supplied command line through the platform shell, feeding the
/// input buffer on stdin and capturing both output streams.
pub struct ShellTransform {
    command: String,
}

impl ShellTransform {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Transform for ShellTransform {
    fn run(&self, input: &[u8]) -> Result<TransformOutput, Error> {
        let mut child = shell_command(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from its own thread so a child that fills its stdout
        // pipe before draining stdin cannot deadlock us. A child that exits
        // without reading all of its input is fine, hence the ignored write
        // result (broken pipe).
        let mut stdin = child.stdin.take().expect("stdin was piped");
        let input = input.to_vec();
        let writer = thread::spawn(move || {
            let _ = stdin.write_all(&input);
        });
        let output = child.wait_with_output()?;
        let _ = writer.join();

        if !output.status.success() {
            return Err(Error::TransformFailed {
                command: self.command.clone(),
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(TransformOutput { stdout: output.stdout, stderr: output.stderr })
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cat_is_identity() {
        let out = ShellTransform::new("cat").run(b"hello\nworld\n").unwrap();
        assert_eq!(out.stdout, b"hello\nworld\n");
        assert_eq!(out.stderr, b"");
    }

    #[test]
    fn tr_rewrites_bytes() {
        let out = ShellTransform::new("tr a b").run(b"banana").unwrap();
        assert_eq!(out.stdout, b"bbnbnb");
    }

    #[test]
    fn stderr_is_captured_as_diagnostic() {
        let out = ShellTransform::new("echo some note >&2; cat")
            .run(b"payload")
            .unwrap();
        assert_eq!(out.stdout, b"payload");
        assert_eq!(out.stderr, b"some note\n");
    }

    #[test]
    fn nonzero_exit_is_fatal() {
        let err = ShellTransform::new("echo partial; echo broken >&2; exit 3")
            .run(b"payload")
            .unwrap_err();
        match err {
            Error::TransformFailed { command, status, stdout, stderr } => {
                assert_eq!(command, "echo partial; echo broken >&2; exit 3");
                assert_eq!(status.code(), Some(3));
                assert_eq!(stdout, b"partial\n");
                assert_eq!(stderr, b"broken\n");
            }
            other => panic!("expected TransformFailed, got {other:?}"),
        }
    }

    #[test]
    fn large_input_does_not_deadlock() {
        // Bigger than any pipe buffer in both directions.
        let input = vec![b'x'; 1 << 20];
        let out = ShellTransform::new("cat").run(&input).unwrap();
        assert_eq!(out.stdout.len(), input.len());
    }
}
