//! The apply/commit loop and the session controller
//!
//! The driver walks the cursor from `next` through `last`, one patch at a
//! time: parse, persist author and message, apply, commit, advance. The
//! cursor file is rewritten only after the commit for the current patch is
//! reachable from HEAD, so a crash at any point resumes correctly from the
//! session directory.

use std::path::PathBuf;

use crate::author::{AuthorIdent, AuthorScript};
use crate::detect::PatchFormat;
use crate::ops::{ApplyStatus, ApplyToIndex, CommitStore, Options, ParseMail, SplitPatches};
use crate::parse::{parse_patch, ParseOutcome};
use crate::state::{AmState, FINAL_COMMIT};
use crate::text::first_line;
use crate::{Error, Result};

/// The external tooling the driver runs against. Production wires every
/// field to [`crate::GitCli`]; tests substitute in-process fakes.
pub struct Tooling<'a> {
    /// Mail splitter
    pub split: &'a dyn SplitPatches,
    /// Mail-header parser
    pub mail: &'a dyn ParseMail,
    /// Index applicator
    pub apply: &'a dyn ApplyToIndex,
    /// Commit plumbing
    pub commits: &'a dyn CommitStore,
}

/// Top-level entry: resume the session on disk if one is in progress,
/// otherwise set up a new one from `paths`, then apply everything queued.
///
/// # Errors
///
/// Propagates setup, parse, apply and commit failures; on apply failure
/// the session directory is left intact for a later resume.
pub fn run_series(
    state: &mut AmState,
    format: Option<PatchFormat>,
    paths: &[PathBuf],
    tools: &Tooling<'_>,
    opts: &Options,
) -> Result<()> {
    if state.in_progress()? {
        state.load()?;
    } else {
        state.setup(format, paths, tools.split)?;
    }

    drive(state, tools, opts)
}

/// Applies all queued patches, then destroys the session.
fn drive(state: &mut AmState, tools: &Tooling<'_>, opts: &Options) -> Result<()> {
    while state.cur <= state.last {
        let mailname = state.msgnum();
        let mail = state.store().path(&mailname);

        // The splitter may have declared this index absent; skip it.
        if mail.is_file() {
            match parse_patch(state, &mail, tools.mail)? {
                ParseOutcome::Skip => {}
                ParseOutcome::Parsed => apply_one(state, &mailname, tools, opts)?,
            }
        }

        state.advance()?;
    }

    state.destroy()
}

/// Persists the per-patch metadata, applies the diff and commits it.
fn apply_one(
    state: &mut AmState,
    mailname: &str,
    tools: &Tooling<'_>,
    opts: &Options,
) -> Result<()> {
    AuthorScript {
        name: state.author_name.clone(),
        email: state.author_email.clone(),
        date: state.author_date.clone(),
    }
    .write(state.store())?;
    state.store().write_scalar(FINAL_COMMIT, &state.msg)?;

    println!("Applying: {}", first_line(&state.msg));

    let patch = state.store().path("patch");
    match tools.apply.apply(&patch)? {
        ApplyStatus::Rejected => {
            println!("Patch failed at {mailname} {}", first_line(&state.msg));
            if opts.advice_amworkdir {
                println!(
                    "The copy of the patch that failed is found in: {}",
                    patch.display()
                );
            }
            Err(Error::PatchFailed)
        }
        ApplyStatus::Applied => commit_current(state, tools.commits, opts),
    }
}

/// Commits the applied index with the current message and author triple.
fn commit_current(state: &AmState, commits: &dyn CommitStore, opts: &Options) -> Result<()> {
    let tree = commits.write_tree()?;

    let parent = commits.head_commit()?;
    if parent.is_none() {
        eprintln!("applying to an empty history");
    }

    let author =
        AuthorIdent::from_triple(&state.author_name, &state.author_email, &state.author_date)?;

    let commit = commits.commit_tree(&tree, parent.as_ref(), &author, &state.msg)?;

    let reflog_msg = format!("{}: {}", opts.reflog_action, first_line(&state.msg));
    commits.update_head(&commit, parent.as_ref(), &reflog_msg)
}
