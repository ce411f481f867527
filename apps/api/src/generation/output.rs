//! Parsing of the AI CLI's delimited stdout into named file contents.
//!
//! The CLI is instructed to emit each document as
//! `===FILE: <name>===` … `===END FILE===`. Filenames come from subprocess
//! output and are untrusted: anything carrying a path separator or a
//! parent-directory segment is rejected before it reaches the filesystem.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

/// One parsed output block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub filename: String,
    pub content: String,
}

/// Extracts all `===FILE:===` blocks from `output`, in source order.
/// Content is trimmed and normalized to exactly one trailing newline.
/// Blocks with unsafe filenames are dropped with a warning.
pub fn parse_output(output: &str) -> Vec<GeneratedFile> {
    static FILE_BLOCK: OnceLock<Regex> = OnceLock::new();
    let re = FILE_BLOCK.get_or_init(|| {
        Regex::new(r"===FILE:\s*(.+?)===\s*\n(?s:(.*?))===END FILE===").expect("valid regex")
    });

    let mut files = Vec::new();
    for captures in re.captures_iter(output) {
        let filename = captures[1].trim().to_string();
        if !is_safe_filename(&filename) {
            warn!("Rejected unsafe filename in CLI output: {filename:?}");
            continue;
        }
        let content = format!("{}\n", captures[2].trim());
        files.push(GeneratedFile { filename, content });
    }
    files
}

/// A filename is safe when it is a single plain path component.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
}
