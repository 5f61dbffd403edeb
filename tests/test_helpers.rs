#![allow(dead_code)]

use assert_cmd::Command;
use btodo::crypto::Secret;
use std::path::Path;

pub const TEST_SECRET: &str = "test-secret";

pub fn test_secret() -> Secret {
    Secret::new(TEST_SECRET).expect("test secret is not empty")
}

/// Creates a `Command` for the `btodo` binary with a clean, non-interactive
/// environment pointing at `data_file`.
pub fn base_btodo_command(data_file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("btodo").expect("btodo binary not built");
    configure_btodo_command(&mut cmd, data_file);
    cmd
}

/// Applies the standard non-interactive environment to an existing `Command`.
pub fn configure_btodo_command(cmd: &mut Command, data_file: &Path) {
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    if let Ok(tmpdir) = std::env::var("TMPDIR") {
        cmd.env("TMPDIR", tmpdir);
    }
    cmd.env("HOME", "/tmp")
        .env("BTODO_DATA_FILE", data_file)
        .env("BTODO_TEST_SECRET", TEST_SECRET);
}
