//! Git subprocess backend
//!
//! Production implementation of the capability traits. Every operation is
//! one `git` child process; stderr is folded into the error on failure.
//! All children run in the process working directory, which the CLI pins
//! to the repository toplevel before the driver starts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::author::AuthorIdent;
use crate::ops::{ApplyStatus, ApplyToIndex, CommitStore, ObjectId, ParseMail, SplitPatches};
use crate::text::decimal_prefix;
use crate::{Error, Result};

/// Launches `git` children for the splitter, parser, applicator and commit
/// plumbing.
#[derive(Debug, Clone, Default)]
pub struct GitCli;

/// Helper to create a git command error with appropriate context
fn git_command_error(operation: &str, error: &std::io::Error) -> Error {
    Error::GitCommand {
        operation: operation.to_string(),
        message: error.to_string(),
        is_not_found: error.kind() == ErrorKind::NotFound,
    }
}

fn git_failed(operation: &str, stderr: &[u8]) -> Error {
    Error::GitCommand {
        operation: operation.to_string(),
        message: String::from_utf8_lossy(stderr).trim_end().to_string(),
        is_not_found: false,
    }
}

impl GitCli {
    /// Absolute path of the repository metadata directory.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run or the current directory is
    /// not inside a repository.
    pub fn git_dir(&self) -> Result<PathBuf> {
        let output = Command::new("git")
            .args(["rev-parse", "--absolute-git-dir"])
            .output()
            .map_err(|e| git_command_error("locate repository", &e))?;

        if !output.status.success() {
            return Err(git_failed("locate repository", &output.stderr));
        }

        let dir = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        Ok(PathBuf::from(dir))
    }

    /// Root of the working tree, for pinning the process directory.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run or reports none.
    pub fn toplevel(&self) -> Result<PathBuf> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| git_command_error("locate working tree", &e))?;

        if !output.status.success() {
            return Err(git_failed("locate working tree", &output.stderr));
        }

        let dir = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        Ok(PathBuf::from(dir))
    }

    /// Reads a boolean from the repository configuration. Unset keys are
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run.
    pub fn config_bool(&self, key: &str) -> Result<Option<bool>> {
        let output = Command::new("git")
            .args(["config", "--bool", "--get", key])
            .output()
            .map_err(|e| git_command_error("read configuration", &e))?;

        if !output.status.success() {
            return Ok(None); // unset
        }

        match String::from_utf8_lossy(&output.stdout).trim_end() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Ok(None),
        }
    }

    /// Path of the legacy scripted implementation, `<exec-path>/git-am`.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run.
    pub fn legacy_am_path(&self) -> Result<PathBuf> {
        let output = Command::new("git")
            .arg("--exec-path")
            .output()
            .map_err(|e| git_command_error("locate exec path", &e))?;

        if !output.status.success() {
            return Err(git_failed("locate exec path", &output.stderr));
        }

        let dir = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        Ok(PathBuf::from(dir).join("git-am"))
    }
}

impl SplitPatches for GitCli {
    fn split(&self, out_dir: &Path, prec: usize, paths: &[PathBuf]) -> Result<usize> {
        // git mailsplit -d<prec> -o<dir> -b -- <paths...>
        // With no paths mailsplit reads the mbox from stdin.
        let mut cmd = Command::new("git");
        cmd.arg("mailsplit")
            .arg(format!("-d{prec}"))
            .arg(format!("-o{}", out_dir.display()))
            .arg("-b")
            .arg("--")
            .args(paths)
            .stdin(Stdio::inherit());

        let output = cmd
            .output()
            .map_err(|e| git_command_error("split patches", &e))?;

        if !output.status.success() {
            return Err(git_failed("split patches", &output.stderr));
        }

        Ok(decimal_prefix(
            String::from_utf8_lossy(&output.stdout).trim_start(),
        ))
    }
}

impl ParseMail for GitCli {
    fn extract(&self, mail: &Path, info: &Path, msg: &Path, patch: &Path) -> Result<()> {
        // git mailinfo <msg> <patch>, stdin = mail, stdout = info
        let mail_file = fs::File::open(mail).map_err(|e| Error::io("open", mail, e))?;
        let info_file = fs::File::create(info).map_err(|e| Error::io("create", info, e))?;

        let output = Command::new("git")
            .arg("mailinfo")
            .arg(msg)
            .arg(patch)
            .stdin(Stdio::from(mail_file))
            .stdout(Stdio::from(info_file))
            .output()
            .map_err(|e| git_command_error("parse mail", &e))?;

        if !output.status.success() {
            return Err(git_failed("parse mail", &output.stderr));
        }

        Ok(())
    }
}

impl ApplyToIndex for GitCli {
    fn apply(&self, patch: &Path) -> Result<ApplyStatus> {
        // git apply --index <patch>; the tool's own diagnostics go straight
        // through to the user.
        let status = Command::new("git")
            .args(["apply", "--index"])
            .arg(patch)
            .status()
            .map_err(|e| git_command_error("apply patch", &e))?;

        if status.success() {
            Ok(ApplyStatus::Applied)
        } else {
            Ok(ApplyStatus::Rejected)
        }
    }
}

impl CommitStore for GitCli {
    fn write_tree(&self) -> Result<ObjectId> {
        let output = Command::new("git")
            .arg("write-tree")
            .output()
            .map_err(|e| git_command_error("write tree", &e))?;

        if !output.status.success() {
            return Err(git_failed("write tree", &output.stderr));
        }

        Ok(ObjectId(
            String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
        ))
    }

    fn head_commit(&self) -> Result<Option<ObjectId>> {
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])
            .output()
            .map_err(|e| git_command_error("resolve HEAD", &e))?;

        // Non-zero means HEAD does not resolve yet: an unborn branch.
        if !output.status.success() {
            return Ok(None);
        }

        Ok(Some(ObjectId(
            String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
        )))
    }

    fn commit_tree(
        &self,
        tree: &ObjectId,
        parent: Option<&ObjectId>,
        author: &AuthorIdent,
        message: &str,
    ) -> Result<ObjectId> {
        let mut cmd = Command::new("git");
        cmd.arg("commit-tree").arg(&tree.0);
        if let Some(parent) = parent {
            cmd.args(["-p", &parent.0]);
        }
        cmd.args(["-m", message])
            .env("GIT_AUTHOR_NAME", &author.name)
            .env("GIT_AUTHOR_EMAIL", &author.email)
            .env("GIT_AUTHOR_DATE", &author.date);

        let output = cmd
            .output()
            .map_err(|e| git_command_error("write commit object", &e))?;

        if !output.status.success() {
            return Err(git_failed("write commit object", &output.stderr));
        }

        Ok(ObjectId(
            String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
        ))
    }

    fn update_head(
        &self,
        new: &ObjectId,
        expected_old: Option<&ObjectId>,
        reflog_msg: &str,
    ) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["update-ref", "-m", reflog_msg, "HEAD", &new.0]);
        if let Some(old) = expected_old {
            cmd.arg(&old.0);
        }

        let output = cmd
            .output()
            .map_err(|e| git_command_error("update HEAD", &e))?;

        if !output.status.success() {
            return Err(git_failed("update HEAD", &output.stderr));
        }

        Ok(())
    }
}
