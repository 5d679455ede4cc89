mod build;
mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use imgforge_config::ForgeConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgforge")]
#[command(about = "レシピディレクトリの Dockerfile をまとめてビルドする", long_about = None)]
struct Cli {
    /// 設定ファイルのパス
    #[arg(short, long, global = true, env = "IMGFORGE_CONFIG")]
    config: Option<PathBuf>,
    /// 詳細ログを表示
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 全レシピをビルドし、latest タグを付けて不要レイヤーを削除
    #[command(visible_alias = "all")]
    Build {
        #[command(flatten)]
        target: TargetArgs,
        /// ビルドコンテキスト（デフォルトはカレントディレクトリ）
        #[arg(long, env = "IMGFORGE_CONTEXT")]
        context: Option<PathBuf>,
        /// イメージ名の名前空間
        #[arg(long)]
        namespace: Option<String>,
        /// イメージ名のプレフィックス
        #[arg(long)]
        prefix: Option<String>,
        /// 使用するコンテナCLI
        #[arg(long)]
        docker: Option<String>,
        /// コマンドを表示するだけで実行しない
        #[arg(long)]
        dry_run: bool,
        /// tag/prune の失敗も失敗として扱う（`--strict-cleanup=false` で設定ファイルの値を無効化）
        #[arg(
            long,
            env = "IMGFORGE_STRICT_CLEANUP",
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true"
        )]
        strict_cleanup: Option<bool>,
    },
    /// 検出したレシピとイメージ名を表示
    List {
        #[command(flatten)]
        target: TargetArgs,
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[derive(Args)]
struct TargetArgs {
    /// レシピを探すディレクトリ
    #[arg(short, long, env = "IMGFORGE_DIR")]
    dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ビルド出力と混ざらないようにログは stderr へ
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("imgforge {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (config, config_path) = ForgeConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            target,
            context,
            namespace,
            prefix,
            docker,
            dry_run,
            strict_cleanup,
        } => {
            let settings = utils::build_settings(
                &config,
                utils::SettingsOverrides {
                    dir: target.dir,
                    context,
                    namespace,
                    prefix,
                    docker,
                    strict_cleanup,
                },
            );
            let report =
                build::handle_build_command(settings, config_path.as_deref(), dry_run).await?;
            if report.has_failures() {
                std::process::exit(1);
            }
        }
        Commands::List { target, json } => {
            let settings = utils::build_settings(
                &config,
                utils::SettingsOverrides {
                    dir: target.dir,
                    ..Default::default()
                },
            );
            commands::list::handle(settings, json)?;
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
