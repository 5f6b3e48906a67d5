//! Shared E2E test helpers for `cotick` binary tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(10);

const COTICK_VARS: &[&str] = &[
    "COTICK_DEBUG",
    "COTICK_SMART",
    "COTICK_MAX_TICKS",
    "COTICK_ROUTINES",
    "COTICK_SAVE_FILE",
    "RUST_LOG",
];

/// Builds a `cotick` command isolated in a fresh directory.
///
/// The directory is both `HOME` and the project root, so neither a
/// global nor a project config leaks in. Keep the guard alive for the
/// test's duration.
pub fn cotick_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let cmd = cotick_cmd_in(tmp.path());
    (cmd, tmp)
}

/// Same as [`cotick_cmd`] in an existing directory (multi-run tests).
pub fn cotick_cmd_in(dir: &Path) -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("cotick");
    cmd.timeout(TIMEOUT);
    for var in COTICK_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", dir);
    cmd.current_dir(dir);
    cmd
}

/// Writes `content` to `dir/name` and returns the path as a string.
pub fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write test file");
    path.to_str().expect("valid utf8").to_string()
}
