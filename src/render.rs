use owo_colors::OwoColorize;
use similar::TextDiff;

use crate::change::{Change, ContentChange, RenameChange};

/// Renders one change as a human-readable block for review. Pure
/// projection: nothing here mutates the change set, and nothing downstream
/// depends on the result. `colors` is decided by the caller (terminal
/// detection lives in the CLI, not here).
pub fn to_term_str(change: &Change, colors: bool) -> String {
    match change {
        Change::Rename(r) => rename_str(r, colors),
        Change::Content(c) => content_str(c, colors),
    }
}

fn rename_str(r: &RenameChange, colors: bool) -> String {
    let mut s = format!(
        "{}  {} {} {}",
        head("move", colors),
        r.old.display(),
        bold("→", colors),
        r.new.display(),
    );
    if r.recursion_skipped {
        s.push('\n');
        s.push_str(&dim("info:", colors));
        s.push_str(" skipping contents because recursion was not requested");
    }
    if r.old_is_dir {
        s.push('\n');
        s.push_str(&attn("attn:", colors));
        s.push_str(" will be ignored (dirs not yet supported)");
    }
    push_note(&mut s, &r.transform_stderr, colors);
    s.trim_end_matches('\n').to_string()
}

fn content_str(c: &ContentChange, colors: bool) -> String {
    let mut s = format!("{}{}:\n", head("patch ", colors), c.path.display());

    // Lossy conversion is fine here: the diff is display-only, the bytes
    // that get applied are untouched.
    let old = String::from_utf8_lossy(&c.old);
    let new = String::from_utf8_lossy(&c.new);
    let diff = TextDiff::from_lines(old.as_ref(), new.as_ref());
    for line in diff.unified_diff().context_radius(3).to_string().lines() {
        s.push_str("        ");
        s.push_str(&diff_line(line, colors));
        s.push('\n');
    }
    push_note(&mut s, &c.transform_stderr, colors);
    s.trim_end_matches('\n').to_string()
}

/// Appends the transform's stderr as an indented `note:` block, first line
/// on the same row as the label.
fn push_note(s: &mut String, stderr: &[u8], colors: bool) {
    if stderr.is_empty() {
        return;
    }
    s.push('\n');
    s.push_str(&dim("note:", colors));
    s.push(' ');
    let text = String::from_utf8_lossy(stderr);
    for (idx, line) in text.lines().enumerate() {
        if idx > 0 {
            s.push_str("\n      ");
        }
        s.push_str(line);
    }
}

fn diff_line(line: &str, colors: bool) -> String {
    if !colors {
        return line.to_string();
    }
    if line.starts_with('+') {
        format!("{}", line.green())
    } else if line.starts_with('-') {
        format!("{}", line.red())
    } else {
        line.to_string()
    }
}

fn head(s: &str, colors: bool) -> String {
    if colors { format!("{}", s.yellow().bold()) } else { s.to_string() }
}

fn bold(s: &str, colors: bool) -> String {
    if colors { format!("{}", s.bold()) } else { s.to_string() }
}

fn dim(s: &str, colors: bool) -> String {
    if colors { format!("{}", s.dimmed()) } else { s.to_string() }
}

fn attn(s: &str, colors: bool) -> String {
    if colors { format!("{}", s.red()) } else { s.to_string() }
}
