pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_ENV: &str = "IMGFORGE_CONFIG";

const CANDIDATES: [&str; 4] = [
    "imgforge.local.yaml",
    ".imgforge.local.yaml",
    "imgforge.yaml",
    ".imgforge.yaml",
];

/// 設定ファイルに書かれた値（省略されたキーは None）
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    namespace: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
    scan_dir: Option<PathBuf>,
    context_dir: Option<PathBuf>,
    docker: Option<String>,
    strict_cleanup: Option<bool>,
}

/// imgforge の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeConfig {
    /// イメージ名の名前空間（`<namespace>/...`）
    pub namespace: String,
    /// イメージ名のプレフィックス（`<prefix>-<lang>`）
    pub prefix: String,
    /// レシピファイルのサフィックス
    pub suffix: String,
    /// レシピを探すディレクトリ
    pub scan_dir: PathBuf,
    /// ビルドコンテキスト
    pub context_dir: PathBuf,
    /// 外部CLI
    pub docker: String,
    /// tag/prune の失敗を結果に含める
    pub strict_cleanup: bool,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            namespace: "danielbok".to_string(),
            prefix: "nida".to_string(),
            suffix: ".Dockerfile".to_string(),
            scan_dir: PathBuf::from("."),
            context_dir: PathBuf::from("."),
            docker: "docker".to_string(),
            strict_cleanup: false,
        }
    }
}

impl ForgeConfig {
    /// 設定ファイルを読み込む
    ///
    /// 省略されたキーはデフォルト値のまま。ファイルに書かれた相対パスの
    /// `scan_dir` / `context_dir` だけを設定ファイルのあるディレクトリ基準で解決する。
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let defaults = ForgeConfig::default();
        let config = ForgeConfig {
            namespace: file.namespace.unwrap_or(defaults.namespace),
            prefix: file.prefix.unwrap_or(defaults.prefix),
            suffix: file.suffix.unwrap_or(defaults.suffix),
            scan_dir: file
                .scan_dir
                .map_or(defaults.scan_dir, |dir| resolve_relative(base, &dir)),
            context_dir: file
                .context_dir
                .map_or(defaults.context_dir, |dir| resolve_relative(base, &dir)),
            docker: file.docker.unwrap_or(defaults.docker),
            strict_cleanup: file.strict_cleanup.unwrap_or(defaults.strict_cleanup),
        };

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 設定をロードする
    ///
    /// 明示的なパスがあればそれを読み込み、なければ [`find_config_file`] で探す。
    /// どこにもなければデフォルト値を返す。
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file()?,
        };

        match path {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || base.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// imgforge のグローバル設定ディレクトリ
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("imgforge"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 IMGFORGE_CONFIG (直接パス指定)
/// 2. カレントディレクトリ: imgforge.local.yaml, .imgforge.local.yaml, imgforge.yaml, .imgforge.yaml
/// 3. ~/.config/imgforge/config.yaml (グローバル設定)
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}
