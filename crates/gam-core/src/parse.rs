//! Per-patch intake: drive the mail-header parser and assemble the
//! commit message and author triple

use std::io::ErrorKind;
use std::path::Path;

use crate::ops::ParseMail;
use crate::state::AmState;
use crate::text::stripspace;
use crate::{Error, Result};

/// Author name pine uses for its internal folder metadata; such a mail is
/// not a patch and is skipped.
const MAIL_SYSTEM_INTERNAL_DATA: &str = "Mail System Internal Data";

/// What the driver should do with the parsed mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Author and message extracted; the patch is ready to apply
    Parsed,
    /// Not a real patch; advance without committing
    Skip,
}

/// Parses the mail at `mail` into `state`.
///
/// The mail-header parser writes its header summary to `info`, the body
/// text to `msg` and the diff to `patch`, all inside the session
/// directory. The `info` summary is then scanned for `Subject:`,
/// `Author:`, `Email:` and `Date:` lines, and the final commit message is
/// assembled as subject + blank line + body, whitespace-normalized.
///
/// # Errors
///
/// Returns `Error::EmptyPatch` when the mail carried no diff, and
/// propagates parser and I/O failures.
pub fn parse_patch(
    state: &mut AmState,
    mail: &Path,
    parser: &dyn ParseMail,
) -> Result<ParseOutcome> {
    let info = state.store().path("info");
    let msg_file = state.store().path("msg");
    let patch_file = state.store().path("patch");

    parser.extract(mail, &info, &msg_file, &patch_file)?;

    let summary = state
        .store()
        .read_scalar("info", false)?
        .ok_or_else(|| Error::io("read", &info, ErrorKind::NotFound.into()))?;
    scan_info(state, &summary);

    // Pine's internal folder data is not a patch.
    if state.author_name == MAIL_SYSTEM_INTERNAL_DATA {
        return Ok(ParseOutcome::Skip);
    }

    if is_empty_file(&patch_file)? {
        return Err(Error::EmptyPatch);
    }

    let body = state
        .store()
        .read_scalar("msg", false)?
        .ok_or_else(|| Error::io("read", &msg_file, ErrorKind::NotFound.into()))?;
    state.msg.push_str("\n\n");
    state.msg.push_str(&body);
    state.msg = stripspace(&state.msg);

    Ok(ParseOutcome::Parsed)
}

/// Extracts message and author information from the header summary.
///
/// `Subject:` lines are concatenated with embedded newlines in arrival
/// order. For the author triple only the first occurrence counts; a
/// repeated header cannot name a second author, so later ones are dropped.
fn scan_info(state: &mut AmState, summary: &str) {
    for line in summary.lines() {
        if let Some(subject) = line.strip_prefix("Subject: ") {
            if !state.msg.is_empty() {
                state.msg.push('\n');
            }
            state.msg.push_str(subject);
        } else if let Some(name) = line.strip_prefix("Author: ") {
            keep_first(&mut state.author_name, name, "Author");
        } else if let Some(email) = line.strip_prefix("Email: ") {
            keep_first(&mut state.author_email, email, "Email");
        } else if let Some(date) = line.strip_prefix("Date: ") {
            keep_first(&mut state.author_date, date, "Date");
        }
    }
}

fn keep_first(slot: &mut String, value: &str, header: &str) {
    if slot.is_empty() {
        slot.push_str(value);
    } else {
        tracing::warn!("ignoring repeated {header}: header");
    }
}

/// True if the file is missing or has zero length.
fn is_empty_file(path: &Path) -> Result<bool> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len() == 0),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(Error::io("stat", path, e)),
    }
}
