use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_recipe(&self, name: &str, content: &str) {
        fs::write(self.root.path().join(name), content).unwrap();
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.path().join("imgforge.yaml"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// ホームのグローバル設定や環境変数の影響を受けないコマンド
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("imgforge").unwrap();
        cmd.current_dir(self.root.path())
            .env_remove("IMGFORGE_CONFIG")
            .env_remove("IMGFORGE_DIR")
            .env_remove("IMGFORGE_CONTEXT")
            .env_remove("IMGFORGE_STRICT_CLEANUP")
            .env_remove("RUST_LOG")
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path())
            .env("NO_COLOR", "1");
        cmd
    }
}

pub fn display(path: &Path) -> String {
    path.display().to_string()
}
