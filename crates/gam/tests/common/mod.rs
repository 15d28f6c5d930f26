//! Shared harness for gam integration tests
//!
//! Provisions a scratch git repository per test and runs the gam binary
//! inside it with the builtin gate enabled. Tests call `Harness::new()`
//! and bail out early (with a notice) when git is not installed.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::Command as GamCommand;
use tempfile::TempDir;

pub struct Harness {
    root: TempDir,
}

impl Harness {
    /// Creates an initialized git repository in a temp directory, or
    /// `None` when git is unavailable on this machine.
    pub fn new() -> Option<Self> {
        if Command::new("git").arg("--version").output().is_err() {
            eprintln!("skipping: git is not installed");
            return None;
        }

        let root = TempDir::new().expect("failed to create temp dir");
        let harness = Self { root };
        // --initial-branch needs git >= 2.28; fall back for older ones.
        let init = Command::new("git")
            .args(["init", "--initial-branch=main", "."])
            .current_dir(harness.path())
            .output()
            .expect("failed to run git init");
        if !init.status.success() {
            harness.git(&["init", "."]);
        }
        harness.git(&["config", "user.name", "Test Committer"]);
        harness.git(&["config", "user.email", "committer@example.com"]);
        Some(harness)
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn session_dir(&self) -> PathBuf {
        self.path().join(".git/rebase-apply")
    }

    /// Runs a git command in the repository, asserting success.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// A gam command ready to run in the repository, with the builtin
    /// gate set so the process does not re-exec the scripted git-am.
    pub fn gam(&self) -> GamCommand {
        let mut cmd = GamCommand::cargo_bin("gam").expect("gam binary");
        cmd.current_dir(self.path())
            .env("_GIT_USE_BUILTIN_AM", "1")
            .env_remove("GIT_REFLOG_ACTION")
            .env_remove("GIT_DIR");
        cmd
    }

    /// Writes a file under the repository root.
    pub fn write_file(&self, rel: &str, contents: &str) {
        std::fs::write(self.path().join(rel), contents).expect("failed to write file");
    }

    /// Reads a file under the repository root.
    pub fn read_file(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).expect("failed to read file")
    }

    /// Subjects of all commits reachable from HEAD, oldest first.
    pub fn subjects(&self) -> Vec<String> {
        self.git(&["log", "--reverse", "--format=%s"])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// One mbox entry creating file `f` with contents `hi\n`.
pub const PATCH_CREATE_F: &str = "\
From 1234567890abcdef1234567890abcdef12345678 Mon Sep 17 00:00:00 2001
From: A U Thor <author@example.com>
Date: Fri, 9 Jun 2006 00:44:16 -0700
Subject: [PATCH] hello

---
 f | 1 +
 1 file changed, 1 insertion(+)

diff --git a/f b/f
new file mode 100644
index 0000000..45b983b
--- /dev/null
+++ b/f
@@ -0,0 +1 @@
+hi
";

/// One mbox entry appending `world` to `f` (expects `hi\n`).
pub const PATCH_EXTEND_F: &str = "\
From 234567890abcdef1234567890abcdef123456789 Mon Sep 17 00:00:00 2001
From: A U Thor <author@example.com>
Date: Fri, 9 Jun 2006 00:45:16 -0700
Subject: [PATCH] world

---
 f | 1 +
 1 file changed, 1 insertion(+)

diff --git a/f b/f
index 45b983b..3b097cd 100644
--- a/f
+++ b/f
@@ -1 +1,2 @@
 hi
+world
";

/// One mbox entry whose diff expects `f` to contain `hello\n`; conflicts
/// with the series above.
pub const PATCH_CONFLICTING: &str = "\
From 34567890abcdef1234567890abcdef1234567890 Mon Sep 17 00:00:00 2001
From: B Other <other@example.com>
Date: Fri, 9 Jun 2006 00:46:16 -0700
Subject: [PATCH] world

---
 f | 1 +
 1 file changed, 1 insertion(+)

diff --git a/f b/f
index ce01362..94954ab 100644
--- a/f
+++ b/f
@@ -1 +1,2 @@
 hello
+world
";

/// Pine folder-metadata entry; not a patch, must be skipped.
pub const PINE_INTERNAL_DATA: &str = "\
From 4567890abcdef1234567890abcdef12345678901 Mon Sep 17 00:00:00 2001
From: Mail System Internal Data <MAILER-DAEMON@example.com>
Date: Fri, 9 Jun 2006 00:40:00 -0700
Subject: DON'T DELETE THIS MESSAGE -- FOLDER INTERNAL DATA

This text is part of the internal format of your mail folder, and is not
a real message.
";
