//! In-memory session state
//!
//! Mirrors the durable fields needed to drive the apply loop: the cursor
//! pair, the author triple and the commit message for the patch under the
//! cursor. The session directory on disk is the single source of truth;
//! this struct is rebuilt from it on resume.

use std::path::PathBuf;

use crate::author::{AuthorScript, AUTHOR_SCRIPT};
use crate::detect::{detect_patch_format, PatchFormat};
use crate::ops::SplitPatches;
use crate::session::SessionStore;
use crate::text::decimal_prefix;
use crate::{Error, Result};

/// File holding the final commit message for the patch under the cursor.
pub const FINAL_COMMIT: &str = "final-commit";

/// Width of the zero-padded patch filenames.
const PREC: usize = 4;

/// The state of one patch-application session.
#[derive(Debug)]
pub struct AmState {
    store: SessionStore,

    /// 1-indexed cursor of the patch to process next
    pub(crate) cur: usize,
    /// 1-indexed index of the final patch
    pub(crate) last: usize,

    /// Author triple for the patch under the cursor; opaque to us
    pub(crate) author_name: String,
    pub(crate) author_email: String,
    pub(crate) author_date: String,

    /// Commit message for the patch under the cursor
    pub(crate) msg: String,

    /// Patch filename width, fixed at 4
    pub(crate) prec: usize,
}

impl AmState {
    /// Creates a fresh state rooted at `dir` (normally
    /// `<git-dir>/rebase-apply`). Nothing is read from disk yet.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            store: SessionStore::new(dir),
            cur: 0,
            last: 0,
            author_name: String::new(),
            author_email: String::new(),
            author_date: String::new(),
            msg: String::new(),
            prec: PREC,
        }
    }

    /// The underlying session store.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Cursor of the patch to process next.
    #[must_use]
    pub const fn cur(&self) -> usize {
        self.cur
    }

    /// Index of the final patch.
    #[must_use]
    pub const fn last(&self) -> usize {
        self.last
    }

    /// Commit message of the patch under the cursor.
    #[must_use]
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Whether a session is in progress on disk.
    ///
    /// # Errors
    ///
    /// Propagates fatal stat failures from the store.
    pub fn in_progress(&self) -> Result<bool> {
        self.store.in_progress()
    }

    /// Filename of the patch under the cursor, zero-padded to the fixed
    /// width.
    #[must_use]
    pub fn msgnum(&self) -> String {
        format!("{:0width$}", self.cur, width = self.prec)
    }

    /// Loads a session from disk: cursor files, author script (absent is
    /// permitted, malformed is fatal) and the pending commit message.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedAuthorScript` for a corrupt author script
    /// and `Error::Io` for any unreadable state file.
    pub fn load(&mut self) -> Result<()> {
        self.cur = self
            .store
            .read_scalar("next", true)?
            .as_deref()
            .map_or(0, decimal_prefix);
        self.last = self
            .store
            .read_scalar("last", true)?
            .as_deref()
            .map_or(0, decimal_prefix);

        if let Some(script) = AuthorScript::read(&self.store)? {
            self.author_name = script.name;
            self.author_email = script.email;
            self.author_date = script.date;
        }

        self.msg = self
            .store
            .read_scalar(FINAL_COMMIT, false)?
            .unwrap_or_default();

        tracing::debug!(cur = self.cur, last = self.last, "loaded session");
        Ok(())
    }

    /// Sets up a new session: detects the patch format when none was
    /// requested, creates the session directory, splits the input into
    /// numbered mails and persists the cursor files. Any failure after the
    /// directory exists removes the half-created session.
    ///
    /// # Errors
    ///
    /// Returns `Error::FormatDetection` when no rule classifies the input
    /// and `Error::SplitFailed` when the splitter reports failure.
    pub fn setup(
        &mut self,
        format: Option<PatchFormat>,
        paths: &[PathBuf],
        splitter: &dyn SplitPatches,
    ) -> Result<()> {
        let format = match format {
            Some(format) => format,
            None => detect_patch_format(paths)?.ok_or(Error::FormatDetection)?,
        };

        self.store.create_dir()?;

        if let Err(e) = self.split_patches(format, paths, splitter) {
            tracing::debug!(error = %e, "splitter failed, removing session");
            self.store.destroy()?;
            return Err(Error::SplitFailed);
        }

        self.store.write_scalar("next", &self.cur.to_string())?;
        self.store.write_scalar("last", &self.last.to_string())?;
        Ok(())
    }

    fn split_patches(
        &mut self,
        format: PatchFormat,
        paths: &[PathBuf],
        splitter: &dyn SplitPatches,
    ) -> Result<()> {
        match format {
            PatchFormat::Mbox => {
                self.last = splitter.split(self.store.dir(), self.prec, paths)?;
                self.cur = 1;
                Ok(())
            }
        }
    }

    /// Advances the cursor past the current patch. The new cursor is
    /// persisted first; only then is the per-patch state cleared, so a
    /// crash in between never leaves stale author data attributed to the
    /// next patch.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the cursor or the scratch files cannot be
    /// updated.
    pub fn advance(&mut self) -> Result<()> {
        self.cur += 1;
        self.store.write_scalar("next", &self.cur.to_string())?;

        self.author_name.clear();
        self.author_email.clear();
        self.author_date.clear();
        self.store.remove(AUTHOR_SCRIPT)?;

        self.msg.clear();
        self.store.remove(FINAL_COMMIT)?;
        Ok(())
    }

    /// Removes the session directory; the run is complete.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if removal fails.
    pub fn destroy(&self) -> Result<()> {
        self.store.destroy()
    }
}
