//! Error types for gam-core

use thiserror::Error;

/// Core error type for patch-series application
#[derive(Debug, Error)]
pub enum Error {
    /// Fatal filesystem error, naming the file involved
    #[error("could not {action} '{path}': {source}")]
    Io {
        /// What was being attempted ("read", "open", "write", ...)
        action: &'static str,
        /// The file or directory involved
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A git child process could not be launched or exited non-zero
    #[error("failed to {operation}: {message}")]
    GitCommand {
        /// The operation being performed ("split patches", "write tree", ...)
        operation: String,
        /// Stderr of the child, or the spawn error
        message: String,
        /// True when the git executable itself was not found
        is_not_found: bool,
    },

    /// None of the detection rules classified the input
    #[error("Patch format detection failed.")]
    FormatDetection,

    /// The mail-splitter reported failure; the session has been removed
    #[error("Failed to split patches.")]
    SplitFailed,

    /// The author script on disk did not survive strict parsing
    #[error("could not parse author script")]
    MalformedAuthorScript,

    /// mailinfo produced no diff for this mail
    #[error(
        "Patch is empty. Was it split wrong?\n\
         If you would prefer to skip this patch, instead run \"gam --skip\".\n\
         To restore the original branch and stop patching run \"gam --abort\"."
    )]
    EmptyPatch,

    /// The author triple failed strict identity validation
    #[error("invalid author identity: {0}")]
    Ident(String),

    /// The patch did not apply; the session is left intact for resume
    #[error("patch application failed")]
    PatchFailed,

    /// Programmer error, not a user error
    #[error("BUG: {0}")]
    Bug(String),
}

impl Error {
    /// Convenience constructor for fatal I/O errors
    #[must_use]
    pub fn io(action: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.display().to_string(),
            source,
        }
    }

    /// Returns the process exit code for this error.
    ///
    /// Every variant is a die()-class failure: the contract is 0 on
    /// success and 128 on anything unrecoverable.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        128
    }
}

/// Result type alias for gam-core operations
pub type Result<T> = std::result::Result<T, Error>;
