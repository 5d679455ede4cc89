//! レシピファイルからイメージ名とタグを導出する
//!
//! レシピ中で最初に現れる `FROM <lang>:<version>` 行から
//! `<namespace>/<prefix>-<lang>:<version>` 形式のイメージ名を組み立てます。

use crate::error::{BuildError, Result};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

/// レシピファイル名のデフォルトサフィックス
pub const DEFAULT_SUFFIX: &str = ".Dockerfile";

static FROM_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FROM (\w+):([\d.]+)").unwrap());

/// イメージ名の組み立て規則
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNaming {
    pub namespace: String,
    pub prefix: String,
    pub suffix: String,
}

impl Default for ImageNaming {
    fn default() -> Self {
        Self {
            namespace: "danielbok".to_string(),
            prefix: "nida".to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl ImageNaming {
    /// `<namespace>/<prefix>-<lang>:<version>`
    ///
    /// namespace が空なら `/` を付けず、prefix が空なら `-` を付けない。
    pub fn image_name(&self, lang: &str, version: &str) -> String {
        let mut name = String::new();
        if !self.namespace.is_empty() {
            name.push_str(&self.namespace);
            name.push('/');
        }
        if !self.prefix.is_empty() {
            name.push_str(&self.prefix);
            name.push('-');
        }
        format!("{}{}:{}", name, lang, version)
    }

    pub fn build_file_name(&self, lang: &str) -> String {
        format!("{}{}", lang, self.suffix)
    }

    /// ファイル名がレシピとして認識されるか
    pub fn is_recipe(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.suffix)
    }
}

/// ビルド1回分のイメージ情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    /// ビルドに使うレシピファイル名（`<lang><suffix>`）
    pub build_file_name: String,
    /// `<namespace>/<prefix>-<lang>:<version>`
    pub image_name: String,
}

impl ImageDescriptor {
    /// レシピ本文から導出する。最初にマッチした行だけを使う。
    pub fn from_recipe(content: &str, naming: &ImageNaming) -> Option<Self> {
        content.lines().find_map(|line| {
            let caps = FROM_LINE.captures(line)?;
            let lang = &caps[1];
            let version = &caps[2];
            Some(Self {
                build_file_name: naming.build_file_name(lang),
                image_name: naming.image_name(lang, version),
            })
        })
    }

    /// レシピファイルを読み込んで導出する
    ///
    /// UTF-8 として不正なバイトは置換文字として扱う。
    pub fn from_file(path: &Path, naming: &ImageNaming) -> Result<Option<Self>> {
        let bytes = std::fs::read(path).map_err(|source| BuildError::ReadRecipe {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_recipe(&String::from_utf8_lossy(&bytes), naming))
    }

    /// `latest` エイリアス
    pub fn latest_alias(&self) -> String {
        latest_alias(&self.image_name)
    }
}

/// 最初の `:` より前に `:latest` を付けた名前
///
/// 例: "ns-python:3.11" -> "ns-python:latest"
pub fn latest_alias(image_name: &str) -> String {
    let repository = image_name
        .split_once(':')
        .map_or(image_name, |(name, _)| name);
    format!("{}:latest", repository)
}
