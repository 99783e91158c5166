//! Shared helpers for CLI specs

use assert_cmd::assert::Assert;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Path to the kudos binary, building it once if the test run did not
fn kudos_bin() -> &'static Path {
    static BIN: OnceLock<PathBuf> = OnceLock::new();
    BIN.get_or_init(|| {
        #[allow(deprecated)]
        let path = assert_cmd::cargo::cargo_bin("kudos");
        if !path.exists() {
            let status = std::process::Command::new(env!("CARGO"))
                .args(["build", "--quiet", "-p", "kudos"])
                .status()
                .expect("cargo build -p kudos");
            assert!(status.success(), "building kudos failed");
        }
        path
    })
}

/// A scratch working directory; the CLI's default data dir lands inside it
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default data directory (`./.kudos`)
    pub fn data_dir(&self) -> PathBuf {
        self.path().join(".kudos")
    }

    /// Write a file relative to the project root
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn kudos(&self) -> Kudos {
        let mut cmd = assert_cmd::Command::new(kudos_bin());
        cmd.current_dir(self.path())
            .env_remove("KUDOS_DATA_DIR")
            .env_remove("KUDOS_LOG");
        Kudos { cmd }
    }

    /// Run a command that must succeed with JSON output, returning it parsed
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = args.to_vec();
        full.extend(["--format", "json"]);
        self.kudos().args(&full).passes().json()
    }

    /// Open an account with a balance
    pub fn account(&self, id: &str, balance: u64) {
        self.kudos()
            .args(&["account", "open", id, "--balance", &balance.to_string()])
            .passes();
    }

    /// Create a reward, returning its ID
    pub fn reward(&self, name: &str, cost: u64, stock: &str) -> String {
        let reward = self.json(&[
            "reward",
            "create",
            name,
            "--cost",
            &cost.to_string(),
            "--stock",
            stock,
        ]);
        reward["id"].as_str().unwrap().to_string()
    }

    /// Claim a reward, returning the redemption ID
    pub fn redeem(&self, account: &str, reward: &str, quantity: u32) -> String {
        let redemption = self.json(&["redeem", account, reward, "-q", &quantity.to_string()]);
        redemption["id"].as_str().unwrap().to_string()
    }

    pub fn balance(&self, account: &str) -> u64 {
        self.json(&["account", "show", account])["balance"]
            .as_u64()
            .unwrap()
    }
}

pub struct Kudos {
    cmd: assert_cmd::Command,
}

impl Kudos {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunOutput {
        RunOutput {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> RunOutput {
        RunOutput {
            assert: self.cmd.assert().failure(),
        }
    }
}

pub struct RunOutput {
    assert: Assert,
}

impl RunOutput {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(expected)),
        }
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        Self {
            assert: self
                .assert
                .stdout(predicate::str::contains(unexpected).not()),
        }
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(expected)),
        }
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap_or_else(|e| {
            panic!("stdout is not JSON ({}): {}", e, self.stdout())
        })
    }
}
