//! Shared testing harness for `wildslot` integration tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Testing harness providing an isolated slot directory for CLI exercises.
pub(crate) struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

impl TestContext {
    /// Create a new isolated environment.
    pub(crate) fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    /// Directory the CLI runs in; also the default slot root.
    pub(crate) fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for invoking the compiled `wildslot` binary in the work directory.
    pub(crate) fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("wildslot").expect("Failed to locate wildslot binary");
        cmd.current_dir(&self.work_dir).env_remove("WILDSLOT_ROOT");
        cmd
    }

    /// Run `wildslot put KEY --value ...` and assert success.
    pub(crate) fn put(&self, key: &str, values: &[&str]) {
        let mut cmd = self.cli();
        cmd.args(["put", key]);
        for value in values {
            cmd.arg(format!("--value={}", value));
        }
        cmd.assert().success();
    }

    /// Write a file relative to the work directory.
    pub(crate) fn write_file(&self, relative: &str, content: &str) {
        let path = self.work_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    pub(crate) fn read_file(&self, relative: &str) -> String {
        fs::read_to_string(self.work_dir.join(relative)).expect("Failed to read file")
    }

    /// Run a command and return its stdout.
    pub(crate) fn stdout_of(&self, args: &[&str]) -> String {
        let output = self.cli().args(args).assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("stdout is not UTF-8")
    }
}
