//! レシピの検出とビルドの実行
//!
//! スキャン対象ディレクトリ内のレシピを列挙し、1ファイルずつ
//! build → tag → prune の順に `docker` を呼び出します。
//! 1つのレシピの失敗は他のレシピの処理を止めません。

use crate::descriptor::{ImageDescriptor, ImageNaming};
use crate::error::{BuildError, Result};
use crate::report::{BuildOutcome, BuildReport, CleanupStep};
use crate::runner::CommandRunner;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// オーケストレーターの入力
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// レシピを探すディレクトリ
    pub scan_dir: PathBuf,
    /// `docker image build` に渡すビルドコンテキスト
    pub context_dir: PathBuf,
    /// 外部CLI
    pub docker: String,
    pub naming: ImageNaming,
    /// tag/prune の終了コードを結果に反映するか
    pub strict_cleanup: bool,
}

impl BuildSettings {
    pub fn new(scan_dir: impl Into<PathBuf>, context_dir: impl Into<PathBuf>) -> Self {
        Self {
            scan_dir: scan_dir.into(),
            context_dir: context_dir.into(),
            docker: "docker".to_string(),
            naming: ImageNaming::default(),
            strict_cleanup: false,
        }
    }

    /// レシピファイルを列挙する（非再帰、列挙順のまま）
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let scan_dir = &self.scan_dir;
        if !scan_dir.is_dir() {
            return Err(BuildError::ScanDirNotFound(scan_dir.clone()));
        }

        let mut recipes = Vec::new();
        for entry in std::fs::read_dir(scan_dir)? {
            let path = entry?.path();
            let is_recipe = path
                .file_name()
                .is_some_and(|name| self.naming.is_recipe(&name.to_string_lossy()));
            if is_recipe && path.is_file() {
                recipes.push(path);
            }
        }

        tracing::debug!(
            "Found {} recipe(s) in {}",
            recipes.len(),
            scan_dir.display()
        );
        Ok(recipes)
    }

    /// 各レシピのイメージ名を導出する（何も実行しない）
    pub fn plan(&self) -> Result<Vec<PlannedBuild>> {
        self.discover()?
            .into_iter()
            .map(|recipe| {
                let descriptor = ImageDescriptor::from_file(&recipe, &self.naming)?;
                Ok(PlannedBuild { recipe, descriptor })
            })
            .collect()
    }
}

/// 実行せずに導出だけ行った結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBuild {
    pub recipe: PathBuf,
    pub descriptor: Option<ImageDescriptor>,
}

pub struct Orchestrator<R> {
    settings: BuildSettings,
    runner: R,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(settings: BuildSettings, runner: R) -> Self {
        Self { settings, runner }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// 全レシピをビルド
    pub async fn build_all(&self) -> Result<BuildReport> {
        let mut report = BuildReport::new();

        for recipe in self.settings.discover()? {
            let outcome = self.build_one(&recipe).await?;
            report.record(&recipe, outcome);
        }

        Ok(report)
    }

    /// 1つのレシピをビルド・タグ付けし、不要レイヤーを削除する
    pub async fn build_one(&self, recipe: &Path) -> Result<BuildOutcome> {
        let Some(descriptor) = ImageDescriptor::from_file(recipe, &self.settings.naming)? else {
            println!(
                "{} イメージ名とタグを導出できません。{} を確認してください",
                "⚠".yellow(),
                recipe.display()
            );
            return Ok(BuildOutcome::Unparsable);
        };

        let actual_name = recipe.file_name().map(|n| n.to_string_lossy().into_owned());
        if actual_name.as_deref() != Some(descriptor.build_file_name.as_str()) {
            tracing::warn!(
                "{} declares base '{}', building {} instead",
                recipe.display(),
                descriptor.image_name,
                descriptor.build_file_name
            );
        }

        tracing::info!("Building image: {}", descriptor.image_name);

        let build_file = self.settings.scan_dir.join(&descriptor.build_file_name);
        let code = self
            .docker(&[
                "image",
                "build",
                "-t",
                &descriptor.image_name,
                "-f",
                &build_file.to_string_lossy(),
                &self.settings.context_dir.to_string_lossy(),
            ])
            .await?;

        if code != 0 {
            println!(
                "{} {} のビルドに失敗しました",
                "✗".red(),
                descriptor.build_file_name
            );
            return Ok(BuildOutcome::BuildFailed {
                build_file: descriptor.build_file_name,
                code,
            });
        }

        let latest = descriptor.latest_alias();
        let tag_code = self
            .docker(&["image", "tag", &descriptor.image_name, &latest])
            .await?;
        let prune_code = self.docker(&["image", "prune", "-f"]).await?;

        tracing::info!("Successfully built: {}", descriptor.image_name);

        let cleanup_failure = [(CleanupStep::Tag, tag_code), (CleanupStep::Prune, prune_code)]
            .into_iter()
            .find(|(_, code)| *code != 0);

        match cleanup_failure {
            Some((step, code)) if self.settings.strict_cleanup => {
                println!(
                    "{} {} の {} に失敗しました (exit {})",
                    "✗".red(),
                    descriptor.image_name,
                    step,
                    code
                );
                Ok(BuildOutcome::CleanupFailed {
                    image: descriptor.image_name,
                    step,
                    code,
                })
            }
            Some((step, code)) => {
                tracing::debug!("Ignoring {} exit code {}", step, code);
                Ok(BuildOutcome::Built {
                    image: descriptor.image_name,
                    latest,
                })
            }
            None => Ok(BuildOutcome::Built {
                image: descriptor.image_name,
                latest,
            }),
        }
    }

    async fn docker(&self, args: &[&str]) -> Result<i32> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        self.runner.run(&self.settings.docker, &args).await
    }
}
