#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub cfg: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = dir.path().join("config");
        std::fs::create_dir_all(cfg.join("gmenu")).expect("cfg dir");
        Self { _dir: dir, cfg }
    }

    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("gmenu").unwrap();
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.env_remove("GMENU_LOG");
        cmd
    }

    /// Write `<config>/gmenu/settings.toml` and return its path.
    pub fn write_settings(&self, body: &str) -> PathBuf {
        let path = self.cfg.join("gmenu").join("settings.toml");
        std::fs::write(&path, body).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
