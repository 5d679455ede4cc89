//! レシピごとのビルド結果と集計

use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};

/// 後処理のステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    Tag,
    Prune,
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupStep::Tag => write!(f, "tag"),
            CleanupStep::Prune => write!(f, "prune"),
        }
    }
}

/// 1レシピ分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// ビルドとタグ付けが完了
    Built { image: String, latest: String },
    /// `FROM` 行からイメージ名を導出できなかった
    Unparsable,
    /// ビルドが非0で終了した
    BuildFailed { build_file: String, code: i32 },
    /// tag/prune が非0で終了した（strict_cleanup 時のみ）
    CleanupFailed {
        image: String,
        step: CleanupStep,
        code: i32,
    },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Built { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub recipe: PathBuf,
    pub outcome: BuildOutcome,
}

/// 実行全体の結果（処理順）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    entries: Vec<ReportEntry>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, recipe: &Path, outcome: BuildOutcome) {
        self.entries.push(ReportEntry {
            recipe: recipe.to_path_buf(),
            outcome,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// 結果サマリーを表示
    pub fn print_summary(&self) {
        println!();
        if self.is_empty() {
            println!("{}", "ビルド対象のレシピがありません".yellow());
            return;
        }

        println!("{}", "ビルド結果:".bold());
        for entry in &self.entries {
            let name = entry
                .recipe
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.recipe.display().to_string());

            match &entry.outcome {
                BuildOutcome::Built { image, latest } => {
                    println!("  {} {} → {}, {}", "✓".green(), name, image.cyan(), latest.cyan());
                }
                BuildOutcome::Unparsable => {
                    println!("  {} {} (イメージ名を導出できません)", "✗".red(), name);
                }
                BuildOutcome::BuildFailed { build_file, code } => {
                    println!(
                        "  {} {} ({} のビルドに失敗: exit {})",
                        "✗".red(),
                        name,
                        build_file,
                        code
                    );
                }
                BuildOutcome::CleanupFailed { image, step, code } => {
                    println!(
                        "  {} {} ({} の {} に失敗: exit {})",
                        "✗".red(),
                        name,
                        image,
                        step,
                        code
                    );
                }
            }
        }

        let line = format!("成功: {} / 失敗: {}", self.succeeded(), self.failed());
        if self.has_failures() {
            println!("{}", line.red().bold());
        } else {
            println!("{}", line.green().bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let report = BuildReport::new();
        assert!(report.is_empty());
        assert!(!report.has_failures());
        assert_eq!(report.succeeded(), 0);
    }

    #[test]
    fn test_counts() {
        let mut report = BuildReport::new();
        report.record(
            Path::new("python.Dockerfile"),
            BuildOutcome::Built {
                image: "ns-python:3.11".to_string(),
                latest: "ns-python:latest".to_string(),
            },
        );
        report.record(Path::new("broken.Dockerfile"), BuildOutcome::Unparsable);
        report.record(
            Path::new("java.Dockerfile"),
            BuildOutcome::BuildFailed {
                build_file: "java.Dockerfile".to_string(),
                code: 1,
            },
        );

        assert_eq!(report.entries().len(), 3);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        assert!(report.has_failures());
        assert_eq!(report.entries()[1].recipe, PathBuf::from("broken.Dockerfile"));
    }

    #[test]
    fn test_cleanup_failure_counts_as_failure() {
        let mut report = BuildReport::new();
        report.record(
            Path::new("go.Dockerfile"),
            BuildOutcome::CleanupFailed {
                image: "ns-go:1.22".to_string(),
                step: CleanupStep::Prune,
                code: 2,
            },
        );
        assert!(report.has_failures());
        assert_eq!(CleanupStep::Prune.to_string(), "prune");
    }
}
