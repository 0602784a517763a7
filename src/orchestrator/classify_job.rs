//! 分类任务 - 编排层

use crate::error::FileError;
use crate::models::{ClassifiedReview, Priority};
use crate::services::aggregate::{summarize, ClassificationSummary};
use crate::services::classifier::classify_all;
use crate::services::storage;
use crate::utils::logging::{log_banner, log_distribution};
use crate::utils::truncate_text;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

/// 分类任务：读取最新抓取结果，分类、汇总并写出
pub struct ClassifyJob {
    output_dir: PathBuf,
}

impl ClassifyJob {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 执行分类
    ///
    /// 找不到抓取结果时只打印提示，返回 `Ok(None)`
    pub async fn run(&self) -> Result<Option<ClassificationSummary>> {
        let Some(path) = storage::find_latest_reviews_file(&self.output_dir).await? else {
            let err = FileError::NoReviewsFile {
                dir: self.output_dir.display().to_string(),
            };
            error!("[错误] {}，请先运行 fetch 命令获取评论", err);
            return Ok(None);
        };

        info!("📁 读取文件: {}", path.display());
        let data = storage::load_fetch_output(&path).await?;
        info!("共 {} 条评论待分类", data.reviews.len());

        let rows = classify_all(&data.reviews);
        info!("✅ 分类完成！共处理 {} 条评论", rows.len());

        let summary = summarize(&rows);
        print_summary(&summary);
        print_urgent(&rows);

        storage::save_classified(&self.output_dir, &summary, &rows).await?;
        Ok(Some(summary))
    }
}

fn print_summary(summary: &ClassificationSummary) {
    log_banner("📊 分类统计");
    info!("总评论数: {}", summary.total);
    info!("好评数: {}", summary.positive);
    info!("差评数: {}", summary.negative);
    log_distribution("优先级分布", &summary.priority_distribution, usize::MAX);
    log_distribution("问题类型统计", &summary.issue_counts, usize::MAX);
    log_distribution("语言分布", &summary.language_distribution, 5);
}

/// 预览最多 5 条 P0 评论
fn print_urgent(rows: &[ClassifiedReview]) {
    let urgent: Vec<_> = rows
        .iter()
        .filter(|row| row.priority == Priority::P0.name())
        .take(5)
        .collect();
    if urgent.is_empty() {
        return;
    }

    info!("\n🔥 紧急评论预览:");
    for row in urgent {
        info!("  #{} [{}] {}", row.id, row.issues, truncate_text(&row.review_text, 60));
    }
}
