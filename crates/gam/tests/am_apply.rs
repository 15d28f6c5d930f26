//! End-to-end tests for applying patch series
//!
//! Each test provisions a scratch git repository, feeds gam an mbox and
//! checks the resulting history. Tests are skipped when git is missing.

mod common;

use common::{Harness, PATCH_CREATE_F, PATCH_EXTEND_F, PINE_INTERNAL_DATA};
use predicates::prelude::*;

#[test]
fn test_single_patch_creates_one_commit() {
    let Some(h) = Harness::new() else { return };
    h.write_file("series.mbox", PATCH_CREATE_F);

    h.gam()
        .arg("series.mbox")
        .assert()
        .success()
        .stdout(predicate::str::contains("Applying: hello"))
        .stderr(predicate::str::contains("applying to an empty history"));

    assert_eq!(h.subjects(), ["hello"]);
    assert_eq!(h.read_file("f"), "hi\n");
    assert_eq!(
        h.git(&["log", "-1", "--format=%an <%ae>"]).trim_end(),
        "A U Thor <author@example.com>"
    );
    assert!(!h.session_dir().exists(), "session must be destroyed");
}

#[test]
fn test_two_patch_series_applies_in_order() {
    let Some(h) = Harness::new() else { return };
    h.write_file(
        "series.mbox",
        &format!("{PATCH_CREATE_F}{PATCH_EXTEND_F}"),
    );

    h.gam()
        .arg("series.mbox")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Applying: hello")
                .and(predicate::str::contains("Applying: world")),
        );

    assert_eq!(h.subjects(), ["hello", "world"]);
    assert_eq!(h.read_file("f"), "hi\nworld\n");

    // Reflog records one entry per applied patch, newest first.
    let reflog = h.git(&["log", "-g", "--format=%gs", "HEAD"]);
    let entries: Vec<&str> = reflog.lines().collect();
    assert_eq!(entries, ["am: world", "am: hello"]);

    assert!(!h.session_dir().exists());
}

#[test]
fn test_patch_series_from_stdin() {
    let Some(h) = Harness::new() else { return };

    h.gam()
        .write_stdin(PATCH_CREATE_F)
        .assert()
        .success()
        .stdout(predicate::str::contains("Applying: hello"));

    assert_eq!(h.subjects(), ["hello"]);
}

#[test]
fn test_pine_internal_data_entry_is_skipped() {
    let Some(h) = Harness::new() else { return };
    h.write_file(
        "series.mbox",
        &format!("{PINE_INTERNAL_DATA}{PATCH_CREATE_F}"),
    );

    h.gam().arg("series.mbox").assert().success();

    // Only the real patch became a commit; the cursor walked both.
    assert_eq!(h.subjects(), ["hello"]);
    assert!(!h.session_dir().exists());
}

#[test]
fn test_reflog_action_override() {
    let Some(h) = Harness::new() else { return };
    h.write_file("series.mbox", PATCH_CREATE_F);

    h.gam()
        .env("GIT_REFLOG_ACTION", "replay")
        .arg("series.mbox")
        .assert()
        .success();

    let reflog = h.git(&["log", "-g", "-1", "--format=%gs", "HEAD"]);
    assert_eq!(reflog.trim_end(), "replay: hello");
}

#[test]
fn test_undetectable_input_fails_with_128() {
    let Some(h) = Harness::new() else { return };
    h.write_file("notes.txt", "just some notes\nnothing mail-like\nat all\n");

    h.gam()
        .arg("notes.txt")
        .assert()
        .code(128)
        .stderr(predicate::str::contains("Patch format detection failed."));

    assert!(!h.session_dir().exists());
}

#[test]
fn test_unknown_patch_format_is_a_parse_error() {
    let Some(h) = Harness::new() else { return };

    h.gam()
        .arg("--patch-format=stgit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stgit"));
}

#[test]
fn test_relative_path_resolves_from_invocation_directory() {
    let Some(h) = Harness::new() else { return };
    std::fs::create_dir(h.path().join("sub")).expect("mkdir");
    h.write_file("sub/series.mbox", PATCH_CREATE_F);

    let mut cmd = h.gam();
    cmd.current_dir(h.path().join("sub"));
    cmd.arg("series.mbox").assert().success();

    assert_eq!(h.subjects(), ["hello"]);
}
