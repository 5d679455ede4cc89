use colored::Colorize;
use imgforge_build::{BuildSettings, ImageNaming};
use imgforge_config::ForgeConfig;
use std::path::{Path, PathBuf};

/// CLIで指定された設定の上書き
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub dir: Option<PathBuf>,
    pub context: Option<PathBuf>,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub docker: Option<String>,
    pub strict_cleanup: Option<bool>,
}

/// 設定ファイルの値にCLIの指定を重ねてビルド設定を作る
///
/// 優先順位: CLI（環境変数を含む） > 設定ファイル > デフォルト
pub fn build_settings(config: &ForgeConfig, overrides: SettingsOverrides) -> BuildSettings {
    BuildSettings {
        scan_dir: overrides.dir.unwrap_or_else(|| config.scan_dir.clone()),
        context_dir: overrides
            .context
            .unwrap_or_else(|| config.context_dir.clone()),
        docker: overrides.docker.unwrap_or_else(|| config.docker.clone()),
        naming: ImageNaming {
            namespace: overrides
                .namespace
                .unwrap_or_else(|| config.namespace.clone()),
            prefix: overrides.prefix.unwrap_or_else(|| config.prefix.clone()),
            suffix: config.suffix.clone(),
        },
        strict_cleanup: overrides.strict_cleanup.unwrap_or(config.strict_cleanup),
    }
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_loaded_config_file(path: Option<&Path>) {
    match path {
        Some(path) => println!("📄 設定ファイル: {}", path.display().to_string().cyan()),
        None => println!("📄 設定ファイル: {}", "なし（デフォルト設定）".dimmed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_settings_from_config() {
        let config = ForgeConfig {
            namespace: "acme".to_string(),
            scan_dir: PathBuf::from("/recipes"),
            strict_cleanup: true,
            ..Default::default()
        };

        let settings = build_settings(&config, SettingsOverrides::default());
        assert_eq!(settings.scan_dir, PathBuf::from("/recipes"));
        assert_eq!(settings.context_dir, PathBuf::from("."));
        assert_eq!(settings.naming.namespace, "acme");
        assert_eq!(settings.naming.prefix, "nida");
        assert_eq!(settings.naming.suffix, ".Dockerfile");
        assert!(settings.strict_cleanup);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = ForgeConfig {
            namespace: "acme".to_string(),
            ..Default::default()
        };
        let overrides = SettingsOverrides {
            dir: Some(PathBuf::from("dockerfiles")),
            context: Some(PathBuf::from("ctx")),
            namespace: Some(String::new()),
            prefix: Some("lab".to_string()),
            docker: Some("podman".to_string()),
            strict_cleanup: Some(true),
        };

        let settings = build_settings(&config, overrides);
        assert_eq!(settings.scan_dir, PathBuf::from("dockerfiles"));
        assert_eq!(settings.context_dir, PathBuf::from("ctx"));
        assert_eq!(settings.docker, "podman");
        assert_eq!(settings.naming.image_name("python", "3.11"), "lab-python:3.11");
        assert!(settings.strict_cleanup);
    }

    #[test]
    fn test_cli_can_disable_strict_cleanup() {
        let config = ForgeConfig {
            strict_cleanup: true,
            ..Default::default()
        };
        let overrides = SettingsOverrides {
            strict_cleanup: Some(false),
            ..Default::default()
        };

        let settings = build_settings(&config, overrides);
        assert!(!settings.strict_cleanup);
    }
}
