//! imgforge のイメージビルド機能
//!
//! レシピファイル（`*.Dockerfile`）の検出、`FROM` 行からのイメージ名の導出、
//! 外部 `docker` CLI を使ったビルド・タグ付け・不要レイヤー削除を提供します。

pub mod descriptor;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod runner;

pub use descriptor::{DEFAULT_SUFFIX, ImageDescriptor, ImageNaming, latest_alias};
pub use error::{BuildError, Result};
pub use orchestrator::{BuildSettings, Orchestrator, PlannedBuild};
pub use report::{BuildOutcome, BuildReport, CleanupStep, ReportEntry};
pub use runner::{CommandRunner, DryRunRunner, ProcessRunner, command_line};
