//! Common test utilities for `eol` integration tests
//!
//! Every command runs against a throwaway station directory: HOME points at
//! it (so shell logs and `~/.eol-tester` lookups stay inside) and
//! `EOL_CONFIG` points at a zero-latency mock configuration.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the `eol` binary under test
pub fn eol_binary() -> PathBuf {
    // CARGO_BIN_EXE_<name> is set for integration tests
    if let Some(path) = std::env::var_os("CARGO_BIN_EXE_eol") {
        return PathBuf::from(path);
    }
    #[allow(deprecated)]
    let path = assert_cmd::cargo::cargo_bin("eol");
    path
}

/// A temporary station: home directory, working directory and config file
pub struct TestStation {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl TestStation {
    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    /// Station whose config file holds `config` verbatim
    pub fn with_config(config: Value) -> Self {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("cli_config.json");
        fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        Self { dir, config_path }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a command script into the station and return its path
    pub fn script(&self, name: &str, lines: &[&str]) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    /// `eol` isolated inside this station
    pub fn eol(&self) -> Command {
        let mut cmd = Command::new(eol_binary());
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("USERPROFILE", self.path())
            .env("EOL_CONFIG", &self.config_path)
            .env_remove("EOL_SHELL_LOG_FILE")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Mock configuration without simulated latency
pub fn fast_config() -> Value {
    json!({
        "cli_config": {
            "hardware_mode": "mock",
            "mock": { "connect_delay_ms": 0, "response_delay_ms": 0 },
            "commands": {
                "loadcell": { "defaults": { "monitor_refresh_rate": 0.001 } }
            }
        }
    })
}

/// Parse the JSON document printed on stdout
pub fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eol_binary_exists() {
        let binary = eol_binary();
        assert!(binary.exists(), "eol binary should exist at {:?}", binary);
    }
}
