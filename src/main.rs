use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use full_apply::binary::is_probably_binary;
use full_apply::render::to_term_str;
use full_apply::{
    ApplyOutcome, Change, CollectOptions, Error, ShellTransform, collect_changes,
    detect_conflicts,
};

#[derive(Parser)]
#[command(
    name = "full-apply",
    version,
    about = "Pipe file contents and paths through a shell command, review the changes, then apply them",
    long_about = None
)]
struct Cli {
    /// Shell command that rewrites stdin to stdout
    command: String,

    /// Files and directories to transform
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Apply all changes without asking
    #[arg(short = 'y', long)]
    yes: bool,

    /// Only show what would change, never apply
    #[arg(short = 'n', long, conflicts_with = "yes")]
    no: bool,

    /// Include files and directories whose name starts with a dot
    #[arg(long)]
    hidden: bool,

    /// Pipe binary-looking file contents through the command too
    #[arg(long)]
    binary: bool,

    /// Descend into directories
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Do not propose renames for transformed path strings
    #[arg(long)]
    no_move: bool,

    /// Let a rename replace a destination that already existed when the
    /// changes were collected
    #[arg(long)]
    overwrite: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let transform = ShellTransform::new(&cli.command);
    let opts = CollectOptions {
        hidden: cli.hidden,
        binary: cli.binary,
        recursive: cli.recursive,
        rename: !cli.no_move,
    };
    let changes = collect_changes(&transform, &cli.paths, &opts, &is_probably_binary)?;

    let colors = color_enabled_stdout();
    for change in &changes {
        println!("{}", to_term_str(change, colors));
    }
    if changes.is_empty() {
        println!("nothing to change");
        return Ok(ExitCode::SUCCESS);
    }

    let conflicts = detect_conflicts(&changes);
    if !conflicts.is_empty() {
        eprintln!("refusing to apply: these paths are both a change source and a rename destination:");
        for path in &conflicts {
            eprintln!("  {}", path.display());
        }
        return Ok(ExitCode::FAILURE);
    }

    if cli.no {
        return Ok(ExitCode::SUCCESS);
    }
    if !cli.yes {
        let question = format!("apply {} change(s)?", changes.len());
        if !confirm(&question)? {
            return Ok(ExitCode::SUCCESS);
        }
    }

    for change in &changes {
        match (change, change.apply_to_fs(cli.overwrite)?) {
            (Change::Content(c), ApplyOutcome::Applied) => {
                println!("wrote {}", c.path.display());
            }
            (Change::Rename(r), ApplyOutcome::Applied) => {
                println!("moved {} → {}", r.old.display(), r.new.display());
            }
            (_, ApplyOutcome::SkippedDirectory) => {
                println!("directories are not supported yet, skipping");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn color_enabled_stdout() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// A failed transform command gets its captured streams dumped verbatim;
/// everything else goes through the error's own display.
fn report_error(err: &anyhow::Error) {
    if let Some(Error::TransformFailed { command, stdout, stderr, .. }) =
        err.downcast_ref::<Error>()
    {
        eprintln!("*** ERROR running '{command}' ***");
        let mut sink = io::stderr();
        let _ = sink.write_all(stderr);
        if !stdout.is_empty() {
            eprintln!("output was:");
            let _ = sink.write_all(stdout);
        }
    } else {
        eprintln!("error: {err:#}");
    }
}
