//! 抓取任务 - 编排层
//!
//! 持有配置，负责创建客户端、驱动分页引擎、写出结果文件

use crate::clients::SteamClient;
use crate::config::Config;
use crate::models::FetchOutput;
use crate::services::aggregate::FetchStats;
use crate::services::storage;
use crate::services::ProgressBarObserver;
use crate::utils::logging::{log_banner, log_distribution};
use crate::workflow::{fetch_all, FetchOptions, StopReason};
use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 一次抓取写出的文件与统计
#[derive(Debug)]
pub struct FetchReport {
    pub json_path: PathBuf,
    /// 关闭 CSV 导出时为 `None`
    pub csv_path: Option<PathBuf>,
    pub stats: FetchStats,
    pub stop_reason: StopReason,
}

/// 抓取任务
pub struct FetchJob {
    config: Config,
    app_id: String,
}

impl FetchJob {
    /// # 参数
    /// - `config`: 已合并环境变量的配置
    /// - `app_id`: 命令行指定的应用 ID，优先于配置
    pub fn new(config: Config, app_id: Option<String>) -> Self {
        let app_id = app_id.unwrap_or_else(|| config.app_id.clone());
        Self { config, app_id }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// 执行抓取
    ///
    /// 没有获取到任何评论时不写文件，返回 `Ok(None)`
    pub async fn run(&self, cancel: &CancellationToken) -> Result<Option<FetchReport>> {
        let client = SteamClient::new(&self.config, &self.app_id)?;
        log_startup(&self.app_id, client.params());

        let options = FetchOptions {
            page_delay: self.config.page_delay(),
        };
        let observer = ProgressBarObserver::new();
        let outcome = fetch_all(&client, &options, cancel, Some(&observer)).await?;

        if outcome.reviews.is_empty() {
            warn!("⚠️ 未获取到任何评论数据");
            return Ok(None);
        }
        if outcome.is_partial() {
            warn!(
                "⚠️ 抓取未完整结束（{}），保存已获取的 {} 条",
                outcome.stop_reason,
                outcome.reviews.len()
            );
        }

        let output_dir = Path::new(&self.config.output_dir);
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

        let (json_path, csv_path) =
            storage::fetch_output_paths(output_dir, &self.app_id, Local::now());
        let stats = FetchStats::from_reviews(&outcome.reviews);

        let output = FetchOutput {
            app_id: self.app_id.clone(),
            fetch_time: Local::now().to_rfc3339(),
            total_fetched: outcome.reviews.len(),
            query_summary: outcome.query_summary,
            config: client.params().to_vec(),
            reviews: outcome.reviews,
        };
        storage::save_fetch_json(&json_path, &output).await?;

        let csv_path = if self.config.export_csv {
            storage::save_reviews_csv(&csv_path, &output.reviews).await?;
            Some(csv_path)
        } else {
            None
        };

        print_stats(&stats);

        Ok(Some(FetchReport {
            json_path,
            csv_path,
            stats,
            stop_reason: outcome.stop_reason,
        }))
    }
}

fn log_startup(app_id: &str, params: &[(String, String)]) {
    log_banner("🚀 Steam 评论获取");
    info!("📋 App ID: {}", app_id);
    for (key, value) in params {
        info!("   {} = {}", key, value);
    }
}

fn print_stats(stats: &FetchStats) {
    log_banner("📊 评论统计");
    info!("总评论数: {}", stats.fetched);
    info!("好评: {}", stats.positive);
    info!("差评: {}", stats.negative);
    log_distribution("语言分布 (前5)", &stats.languages, 5);
}
