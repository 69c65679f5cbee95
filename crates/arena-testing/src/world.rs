//! TestWorld pattern for declarative end-to-end CLI test setup.
//!
//! Provides a fluent interface for creating an isolated temp directory,
//! writing configuration/mock fixtures into it, and running the
//! `prompt-arena` binary against them.

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated directory with a config file, an optional mock-response
/// table, and an output directory, wired together for `prompt-arena run`.
pub struct TestWorld {
    temp_dir: TempDir,
    config_path: PathBuf,
    mocks_path: Option<PathBuf>,
    out_dir: PathBuf,
}

impl TestWorld {
    /// Write `config_toml` to a fresh temp directory and point `out/` at a
    /// subdirectory of it.
    pub fn new(config_toml: &str) -> Result<Self> {
        let temp_dir = TempDir::new().context("creating temp dir")?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, config_toml)?;
        let out_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&out_dir)?;

        Ok(Self { temp_dir, config_path, mocks_path: None, out_dir })
    }

    /// Attach a scripted mock-response table, written alongside the config.
    pub fn with_mocks(mut self, mocks_toml: &str) -> Result<Self> {
        let path = self.temp_dir.path().join("mocks.toml");
        std::fs::write(&path, mocks_toml)?;
        self.mocks_path = Some(path);
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Build a `prompt-arena run` command pre-populated with `--config`,
    /// `--out`, `--mock-provider`, and `--mock-config` (if attached). The
    /// caller adds any further flags before calling `.output()`/`.assert()`.
    pub fn run_command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("prompt-arena").context("locating prompt-arena binary")?;
        cmd.arg("run")
            .arg("--config")
            .arg(&self.config_path)
            .arg("--out")
            .arg(&self.out_dir)
            .arg("--mock-provider");
        if let Some(mocks_path) = &self.mocks_path {
            cmd.arg("--mock-config").arg(mocks_path);
        }
        Ok(cmd)
    }

    /// Read `index.json` out of the output directory as JSON.
    pub fn read_index(&self) -> Result<serde_json::Value> {
        let text = std::fs::read_to_string(self.out_dir.join("index.json")).context("reading index.json")?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read every `<RunID>.json` listed in `index.json`.
    pub fn read_results(&self) -> Result<Vec<arena_types::RunResult>> {
        let index = self.read_index()?;
        let run_ids = index["run_ids"].as_array().context("expected 'run_ids' array in index.json")?;
        run_ids
            .iter()
            .map(|id| {
                let id = id.as_str().context("run_id entry was not a string")?;
                let text = std::fs::read_to_string(self.out_dir.join(format!("{id}.json")))?;
                Ok(serde_json::from_str(&text)?)
            })
            .collect()
    }
}
