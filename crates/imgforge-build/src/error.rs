use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Recipe directory not found: {0}")]
    ScanDirNotFound(PathBuf),

    #[error("Failed to read recipe {path}: {source}")]
    ReadRecipe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::ScanDirNotFound(path) => {
                format!(
                    "レシピディレクトリが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. --dir でディレクトリを指定してください\n\
                     2. imgforge.yaml の scan_dir を確認してください",
                    path.display()
                )
            }
            BuildError::Spawn { program, source } => {
                format!(
                    "`{}` を起動できませんでした: {}\n\
                     \n\
                     {} がインストールされ、PATH に含まれているか確認してください。",
                    program, source, program
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
