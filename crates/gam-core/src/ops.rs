//! Capability seams around the external version-control tooling
//!
//! The core drives three child tools (mail-splitter, mail-header parser,
//! index applicator) plus the commit plumbing. Each is a small trait so
//! tests can substitute in-process fakes; the production implementation in
//! [`crate::git`] fulfills them by launching `git` children.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::author::AuthorIdent;
use crate::Result;

/// A hex object name as printed by git plumbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectId(pub String);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of handing a patch to the index applicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    /// The patch applied; the index now contains it
    Applied,
    /// The tool ran and rejected the patch
    Rejected,
}

/// Splits mbox files / Maildirs into numbered per-patch mails.
pub trait SplitPatches {
    /// Writes files `0001`, `0002`, ... (width `prec`) into `out_dir` and
    /// returns the index of the last patch written.
    ///
    /// # Errors
    ///
    /// Returns an error when the splitter cannot run or reports failure.
    fn split(&self, out_dir: &Path, prec: usize, paths: &[PathBuf]) -> Result<usize>;
}

/// Extracts headers, commit message and diff from a single mail.
pub trait ParseMail {
    /// Reads `mail`, writes the header summary to `info`, the body text to
    /// `msg` and the diff to `patch`.
    ///
    /// # Errors
    ///
    /// Returns an error when the parser cannot run or reports failure.
    fn extract(&self, mail: &Path, info: &Path, msg: &Path, patch: &Path) -> Result<()>;
}

/// Applies a diff to the working tree and the index.
pub trait ApplyToIndex {
    /// Hands `patch` to the applicator. A patch the tool rejects is
    /// `Ok(ApplyStatus::Rejected)`, not an error; the caller decides how
    /// to report it.
    ///
    /// # Errors
    ///
    /// Returns an error only when the tool itself cannot be run.
    fn apply(&self, patch: &Path) -> Result<ApplyStatus>;
}

/// Commit plumbing: trees, parents, commit objects, HEAD.
pub trait CommitStore {
    /// Writes the current index as a tree object.
    ///
    /// # Errors
    ///
    /// Returns an error when the tree cannot be written.
    fn write_tree(&self) -> Result<ObjectId>;

    /// Resolves `HEAD` to a commit, or `None` on an unborn branch.
    ///
    /// # Errors
    ///
    /// Returns an error only when resolution itself cannot be attempted.
    fn head_commit(&self) -> Result<Option<ObjectId>>;

    /// Writes a commit object for `tree` with the given parent, author and
    /// message, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error when the commit object cannot be written.
    fn commit_tree(
        &self,
        tree: &ObjectId,
        parent: Option<&ObjectId>,
        author: &AuthorIdent,
        message: &str,
    ) -> Result<ObjectId>;

    /// Points `HEAD` at `new`, recording `reflog_msg`. When `expected_old`
    /// is set the update must be rejected if HEAD moved. A failed update
    /// fails the whole run.
    ///
    /// # Errors
    ///
    /// Returns an error when the reference update fails.
    fn update_head(
        &self,
        new: &ObjectId,
        expected_old: Option<&ObjectId>,
        reflog_msg: &str,
    ) -> Result<()>;
}

/// Process-wide knobs resolved once at startup.
#[derive(Debug, Clone)]
pub struct Options {
    /// Reflog verb: `GIT_REFLOG_ACTION` if set, otherwise `am`
    pub reflog_action: String,
    /// Whether to point at the failing patch file on apply failure;
    /// suppressed only by an explicit `advice.amworkdir = false`
    pub advice_amworkdir: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reflog_action: "am".to_string(),
            advice_amworkdir: true,
        }
    }
}
