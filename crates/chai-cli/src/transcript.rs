//! Terminal transcript cleanup.
//!
//! `script` recordings are full of ANSI escape sequences and repeated
//! redraw lines. Cleaning strips the escapes and control characters and
//! collapses repeated neighboring lines, then rewrites the file in place.

use std::fs;
use std::path::Path;

use regex::Regex;

/// Remove ANSI escape sequences (colors, cursor movement, OSC titles).
#[must_use]
pub fn strip_ansi(content: &str) -> String {
    #[allow(clippy::unwrap_used)] // literal pattern, cannot fail to compile
    let ansi = Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]|\x1b\].*?\x07|\x1b[PX^_].*?\x1b\\").unwrap();
    ansi.replace_all(content, "").into_owned()
}

/// Remove control characters except newlines and tabs.
#[must_use]
pub fn strip_control_chars(content: &str) -> String {
    content
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect()
}

/// Collapse runs of identical neighboring lines (ignoring trailing
/// whitespace) down to one.
#[must_use]
pub fn dedupe_neighbors(content: &str) -> String {
    let mut deduped: Vec<&str> = Vec::new();
    let mut prev: Option<&str> = None;
    for line in content.split('\n') {
        let stripped = line.trim_end();
        if prev != Some(stripped) {
            deduped.push(line);
            prev = Some(stripped);
        }
    }
    deduped.join("\n")
}

/// Clean a transcript file in place. A missing file is a no-op.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or written.
pub fn clean_transcript(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read(path)?;
    let content = String::from_utf8_lossy(&raw);

    let cleaned = dedupe_neighbors(&strip_control_chars(&strip_ansi(&content)));
    fs::write(path, cleaned)
}
