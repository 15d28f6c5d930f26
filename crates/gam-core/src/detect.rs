//! Patch format detection
//!
//! Classifies the input paths as mbox-like before the splitter runs. Stdin
//! and directories (Maildirs) default to mbox; for a regular file the first
//! few header lines decide.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// The patch formats the splitter understands. Only mbox in this version;
/// Maildirs ride through the same splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchFormat {
    /// RFC 2822 messages concatenated with `From ` separator lines, or a
    /// Maildir of one-message-per-file
    Mbox,
}

impl PatchFormat {
    /// Parses a user-supplied `--patch-format` value.
    ///
    /// # Errors
    ///
    /// Returns a description of the accepted values for anything but
    /// `mbox`; the option parser surfaces it.
    pub fn from_arg(arg: &str) -> std::result::Result<Self, String> {
        match arg {
            "mbox" => Ok(Self::Mbox),
            other => Err(format!("unknown patch format '{other}' (expected 'mbox')")),
        }
    }
}

/// Attempts to detect the format of the patches contained in `paths`.
/// Returns `None` when detection fails.
///
/// Rules, in order: an empty list, a leading `-` (stdin) or a leading
/// directory default to mbox; otherwise the first three non-blank-leading
/// lines of the first file are examined, cheap prefix checks first.
///
/// # Errors
///
/// Returns `Error::Io` if the first path cannot be opened or read.
pub fn detect_patch_format(paths: &[PathBuf]) -> Result<Option<PatchFormat>> {
    let Some(first) = paths.first() else {
        return Ok(Some(PatchFormat::Mbox));
    };
    if first.as_os_str() == "-" || first.is_dir() {
        return Ok(Some(PatchFormat::Mbox));
    }

    let file = fs::File::open(first).map_err(|e| Error::io("open", first, e))?;
    let mut lines = BufReader::new(file).lines();

    // First line: skip blank lines until something survives trimming.
    let mut l1 = String::new();
    for line in lines.by_ref() {
        let line = line.map_err(|e| Error::io("read", first, e))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            l1 = trimmed.to_string();
            break;
        }
    }
    let l2 = next_trimmed(&mut lines, first)?;
    let l3 = next_trimmed(&mut lines, first)?;

    if l1.starts_with("From ") || l1.starts_with("From: ") {
        return Ok(Some(PatchFormat::Mbox));
    }
    if !l1.is_empty() && !l2.is_empty() && !l3.is_empty() && is_email(first)? {
        return Ok(Some(PatchFormat::Mbox));
    }

    Ok(None)
}

fn next_trimmed(
    lines: &mut std::io::Lines<BufReader<fs::File>>,
    path: &Path,
) -> Result<String> {
    match lines.next() {
        Some(line) => {
            let line = line.map_err(|e| Error::io("read", path, e))?;
            Ok(line.trim().to_string())
        }
        None => Ok(String::new()),
    }
}

/// Returns true if the file looks like a piece of email a-la RFC 2822.
///
/// All non-indented lines before the first empty line must begin with a
/// plausible header field name: one or more bytes in `!`..`9` or `;`..`~`,
/// followed by a colon that is not the first character. Indented lines are
/// folded continuations and are skipped. An empty line or EOF ends the
/// header area with a positive verdict.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read.
pub fn is_email(path: &Path) -> Result<bool> {
    let file = fs::File::open(path).map_err(|e| Error::io("open", path, e))?;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::io("read", path, e))?;
        let line = line.trim_end();

        if line.is_empty() {
            break; // end of header
        }
        if line.starts_with('\t') || line.starts_with(' ') {
            continue; // folded continuation
        }
        if !is_header_line(line) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// A header line matches `[!-9;-~]+` followed by a `:` past position zero.
fn is_header_line(line: &str) -> bool {
    for (i, b) in line.bytes().enumerate() {
        if (b'!'..=b'9').contains(&b) || (b';'..=b'~').contains(&b) {
            continue;
        }
        return b == b':' && i != 0;
    }
    false // ran out of bytes without finding the colon
}
