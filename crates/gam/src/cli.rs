//! CLI argument definitions and the command workflow
//!
//! Builds the clap command and runs one invocation end to end: resolve the
//! repository, pin the working directory to the toplevel, resolve the
//! process-wide options, then hand over to the core driver.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use gam_core::{
    detect::PatchFormat,
    driver::{run_series, Tooling},
    AmState, GitCli, Options,
};

/// Name of the session directory under the repository metadata directory.
const SESSION_DIR: &str = "rebase-apply";

pub fn cmd_am() -> Command {
    Command::new("gam")
        .about("Apply a series of patches from mailboxes")
        .long_about(
            "Apply a Series of Patches from Mailboxes\n\
             \n\
             WHAT IT DOES:\n\
             Splits the given mbox files or Maildirs into individual\n\
             patches, then for each one extracts the author and commit\n\
             message, applies the diff to the index and working tree, and\n\
             records a commit on the current branch.\n\
             \n\
             Progress lives in <git-dir>/rebase-apply/. If a patch fails\n\
             to apply the session is kept, and running gam again with no\n\
             arguments resumes where it stopped.\n\
             \n\
             Reading from standard input is selected with '-' or by\n\
             passing no paths at all.",
        )
        .arg(
            Arg::new("patch-format")
                .long("patch-format")
                .value_name("format")
                .value_parser(PatchFormat::from_arg)
                .help("Format the patch(es) are in (only 'mbox')"),
        )
        .arg(
            Arg::new("paths")
                .value_name("mbox|Maildir")
                .action(ArgAction::Append)
                .help("Mailbox files or Maildirs; '-' reads from stdin"),
        )
        .after_help(
            "EXAMPLES:\n  \
             # Apply a patch series from a mailing list archive\n  \
             gam series.mbox\n\
             \n  \
             # Pipe a single patch in\n  \
             git format-patch -1 --stdout | gam\n\
             \n  \
             # Resume after fixing a failed patch\n  \
             gam\n\
             \n\
             EXIT CODES:\n  \
             0   all patches applied (or nothing left to do)\n  \
             128 unrecoverable failure; a failed apply keeps the session",
        )
}

/// Runs one `gam` invocation.
///
/// # Errors
///
/// Returns the core error for the caller to map onto an exit code.
pub fn run_cli() -> anyhow::Result<()> {
    let matches = cmd_am().get_matches();

    let format = matches.get_one::<PatchFormat>("patch-format").copied();
    let raw_paths: Vec<String> = matches
        .get_many::<String>("paths")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    // Resolve paths against the invocation directory before moving to the
    // repository toplevel; '-' (stdin) passes through untouched.
    let invoked_from = env::current_dir().context("failed to get current directory")?;
    let paths: Vec<PathBuf> = raw_paths
        .iter()
        .map(|p| resolve_path(&invoked_from, p))
        .collect();

    let git = GitCli;
    let git_dir = git.git_dir()?;
    let toplevel = git.toplevel()?;
    env::set_current_dir(&toplevel)
        .with_context(|| format!("failed to enter {}", toplevel.display()))?;

    // Environment and configuration are read once, before the loop starts.
    let opts = Options {
        reflog_action: env::var("GIT_REFLOG_ACTION").unwrap_or_else(|_| "am".to_string()),
        advice_amworkdir: git.config_bool("advice.amworkdir")?.unwrap_or(true),
    };

    let tools = Tooling {
        split: &git,
        mail: &git,
        apply: &git,
        commits: &git,
    };

    let mut state = AmState::new(git_dir.join(SESSION_DIR));
    tracing::debug!(
        session = %state.store().dir().display(),
        reflog_action = %opts.reflog_action,
        "starting"
    );
    run_series(&mut state, format, &paths, &tools, &opts)?;
    Ok(())
}

fn resolve_path(invoked_from: &Path, arg: &str) -> PathBuf {
    let path = Path::new(arg);
    if arg == "-" || path.is_absolute() {
        path.to_path_buf()
    } else {
        invoked_from.join(path)
    }
}
