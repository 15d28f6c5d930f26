//! gam - apply a series of patches from mailboxes to a git repository
//!
//! Binary name: `gam`

use std::process;

mod cli;

use cli::run_cli;

fn main() {
    // Transparent fallback: unless the gate is set, hand the invocation to
    // the scripted implementation shipped with git.
    if std::env::var_os("_GIT_USE_BUILTIN_AM").is_none() {
        reexec_legacy_am();
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        let code = err
            .downcast_ref::<gam_core::Error>()
            .map(gam_core::Error::exit_code)
            .unwrap_or(128);
        process::exit(code);
    }
}

/// Replaces this process with `<exec-path>/git-am`, passing the original
/// arguments through. Only returns on failure, which is fatal.
fn reexec_legacy_am() {
    let result = gam_core::GitCli
        .legacy_am_path()
        .map(|path| exec(&path, std::env::args_os().skip(1)));

    match result {
        Ok(err) | Err(err) => {
            eprintln!("Error: could not exec git-am: {err}");
            process::exit(128);
        }
    }
}

#[cfg(unix)]
fn exec(
    path: &std::path::Path,
    args: impl Iterator<Item = std::ffi::OsString>,
) -> gam_core::Error {
    use std::os::unix::process::CommandExt;

    let err = process::Command::new(path).args(args).exec();
    gam_core::Error::io("exec", path, err)
}

#[cfg(not(unix))]
fn exec(
    path: &std::path::Path,
    args: impl Iterator<Item = std::ffi::OsString>,
) -> gam_core::Error {
    match process::Command::new(path).args(args).status() {
        Ok(status) => process::exit(status.code().unwrap_or(128)),
        Err(err) => gam_core::Error::io("exec", path, err),
    }
}
