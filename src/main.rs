use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use steam_review_insight::config::DEFAULT_CONFIG_FILE;
use steam_review_insight::utils::logging;
use steam_review_insight::{ClassifyJob, Config, FetchJob};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "review-insight", version, about = "Steam 评论抓取与分类工具")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 抓取指定游戏的全部评论
    Fetch {
        /// 应用 ID（优先于配置文件与环境变量）
        app_id: Option<String>,
        /// 配置文件路径（JSON 或 TOML）
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// 对最新的抓取结果做规则分类
    Classify {
        /// 配置文件路径（JSON 或 TOML）
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // 初始化日志
    logging::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("❌ 运行失败: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fetch { app_id, config } => {
            let config = Config::load(&config)?;
            let cancel = CancellationToken::new();
            spawn_ctrl_c_handler(cancel.clone());

            let job = FetchJob::new(config, app_id);
            if let Some(report) = job.run(&cancel).await? {
                info!(
                    "\n✅ 完成！共获取 {} 条评论（{}）",
                    report.stats.fetched, report.stop_reason
                );
            }
        }
        Command::Classify { config } => {
            let config = Config::load(&config)?;
            ClassifyJob::new(&config.output_dir).run().await?;
        }
    }
    Ok(())
}

/// Ctrl-C 只触发取消，由分页引擎决定何时停下并保存已获取部分
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("\n⚠️ 收到中断信号，正在保存已获取的数据...");
            cancel.cancel();
        }
    });
}
