use crate::utils;
use colored::Colorize;
use imgforge_build::{
    BuildReport, BuildSettings, CommandRunner, DryRunRunner, Orchestrator, ProcessRunner,
};
use std::path::Path;

/// ビルドコマンドを処理
///
/// 全レシピを順番にビルドし、結果を返す。個々のレシピの失敗は
/// レポートに記録されるだけで、ここではエラーにならない。
pub async fn handle_build_command(
    settings: BuildSettings,
    config_path: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<BuildReport> {
    println!("{}", "Dockerイメージをビルド中...".green());
    utils::print_loaded_config_file(config_path);
    println!(
        "レシピディレクトリ: {}",
        settings.scan_dir.display().to_string().cyan()
    );
    println!(
        "ビルドコンテキスト: {}",
        settings.context_dir.display().to_string().cyan()
    );
    if dry_run {
        println!("{}", "ドライラン: コマンドは実行されません".yellow());
    }
    println!();

    let report = if dry_run {
        run(Orchestrator::new(settings, DryRunRunner::stdout())).await?
    } else {
        run(Orchestrator::new(settings, ProcessRunner::stdout())).await?
    };

    report.print_summary();
    Ok(report)
}

async fn run<R: CommandRunner>(orchestrator: Orchestrator<R>) -> anyhow::Result<BuildReport> {
    orchestrator
        .build_all()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
}
