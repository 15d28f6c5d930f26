//! Tests for the crash-safe session: apply failure, retained state and
//! resumption.

mod common;

use common::{Harness, PATCH_CONFLICTING, PATCH_CREATE_F};
use predicates::prelude::*;

fn fail_mid_series(h: &Harness) {
    h.write_file(
        "series.mbox",
        &format!("{PATCH_CREATE_F}{PATCH_CONFLICTING}"),
    );

    h.gam()
        .arg("series.mbox")
        .assert()
        .code(128)
        .stdout(
            predicate::str::contains("Applying: hello")
                .and(predicate::str::contains("Patch failed at 0002 world"))
                .and(predicate::str::contains(
                    "The copy of the patch that failed is found in:",
                )),
        );
}

#[test]
fn test_apply_failure_keeps_the_session() {
    let Some(h) = Harness::new() else { return };
    fail_mid_series(&h);

    // The first patch landed before the failure.
    assert_eq!(h.subjects(), ["hello"]);
    assert_eq!(h.read_file("f"), "hi\n");

    // The session describes patch 2, ready for resume.
    let session = h.session_dir();
    assert!(session.is_dir());
    assert_eq!(h.read_file(".git/rebase-apply/next").trim_end(), "2");
    assert_eq!(h.read_file(".git/rebase-apply/last").trim_end(), "2");

    let script = h.read_file(".git/rebase-apply/author-script");
    assert_eq!(
        script,
        "GIT_AUTHOR_NAME='B Other'\n\
         GIT_AUTHOR_EMAIL='other@example.com'\n\
         GIT_AUTHOR_DATE='Fri, 9 Jun 2006 00:46:16 -0700'\n"
    );

    let final_commit = h.read_file(".git/rebase-apply/final-commit");
    assert!(final_commit.starts_with("world\n"));
}

#[test]
fn test_advice_amworkdir_false_suppresses_patch_path() {
    let Some(h) = Harness::new() else { return };
    h.git(&["config", "advice.amworkdir", "false"]);
    h.write_file(
        "series.mbox",
        &format!("{PATCH_CREATE_F}{PATCH_CONFLICTING}"),
    );

    h.gam()
        .arg("series.mbox")
        .assert()
        .code(128)
        .stdout(
            predicate::str::contains("Patch failed at 0002 world").and(
                predicate::str::contains("The copy of the patch that failed").not(),
            ),
        );
}

#[test]
fn test_resume_completes_the_series_after_a_fix() {
    let Some(h) = Harness::new() else { return };
    fail_mid_series(&h);

    // Put the tree and index in the shape the failed patch expects.
    h.write_file("f", "hello\n");
    h.git(&["add", "f"]);

    h.gam()
        .assert()
        .success()
        .stdout(predicate::str::contains("Applying: world"));

    assert_eq!(h.subjects(), ["hello", "world"]);
    assert_eq!(h.read_file("f"), "hello\nworld\n");
    assert_eq!(
        h.git(&["log", "-1", "--format=%an <%ae>"]).trim_end(),
        "B Other <other@example.com>"
    );
    assert!(!h.session_dir().exists(), "session must be destroyed");
}

#[test]
fn test_resume_without_fix_fails_again_without_moving_the_cursor() {
    let Some(h) = Harness::new() else { return };
    fail_mid_series(&h);

    h.gam().assert().code(128);
    assert_eq!(h.read_file(".git/rebase-apply/next").trim_end(), "2");
    assert_eq!(h.subjects(), ["hello"]);
}

#[test]
fn test_corrupt_author_script_is_fatal_on_resume() {
    let Some(h) = Harness::new() else { return };
    fail_mid_series(&h);

    h.write_file(".git/rebase-apply/author-script", "GIT_AUTHOR_NAME=bare\n");

    h.gam()
        .assert()
        .code(128)
        .stderr(predicate::str::contains("could not parse author script"));
}
