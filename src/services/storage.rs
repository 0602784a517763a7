//! 文件存储服务 - 业务能力层
//!
//! 负责抓取结果与分类结果的 JSON / CSV 读写，以及定位最新的抓取文件

use crate::error::{AppError, AppResult, FileError};
use crate::models::{ClassifiedReview, FetchOutput, Review};
use crate::services::aggregate::ClassificationSummary;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{info, warn};

/// UTF-8 BOM，方便 Excel 识别编码
const UTF8_BOM: &str = "\u{feff}";

/// 抓取结果 CSV 的列；`author_` 前缀列取自作者子对象
pub const REVIEW_CSV_FIELDS: [&str; 20] = [
    "recommendationid",
    "language",
    "review",
    "voted_up",
    "votes_up",
    "votes_funny",
    "weighted_vote_score",
    "comment_count",
    "steam_purchase",
    "received_for_free",
    "written_during_early_access",
    "timestamp_created",
    "timestamp_updated",
    "author_steamid",
    "author_num_games_owned",
    "author_num_reviews",
    "author_playtime_forever",
    "author_playtime_last_two_weeks",
    "author_playtime_at_review",
    "author_last_played",
];

pub const CLASSIFIED_JSON: &str = "classified_reviews.json";
pub const CLASSIFIED_CSV: &str = "classified_reviews.csv";

/// 本次抓取的输出文件路径 `reviews_{app_id}_{timestamp}.json/.csv`
pub fn fetch_output_paths(
    output_dir: &Path,
    app_id: &str,
    now: DateTime<Local>,
) -> (PathBuf, PathBuf) {
    let stem = format!("reviews_{}_{}", app_id, now.format("%Y%m%d_%H%M%S"));
    (
        output_dir.join(format!("{}.json", stem)),
        output_dir.join(format!("{}.csv", stem)),
    )
}

/// 保存抓取结果 JSON
pub async fn save_fetch_json(path: &Path, output: &FetchOutput) -> Result<()> {
    write_pretty_json(path, output).await?;
    info!("✓ JSON 文件已保存: {}", path.display());
    Ok(())
}

/// 保存抓取结果 CSV；没有数据时跳过
pub async fn save_reviews_csv(path: &Path, reviews: &[Review]) -> Result<()> {
    if reviews.is_empty() {
        warn!("没有数据可保存");
        return Ok(());
    }

    let rows = reviews.iter().map(|review| {
        REVIEW_CSV_FIELDS
            .iter()
            .map(|field| review_cell(review, field))
            .collect::<Vec<_>>()
    });
    let content = render_csv(&REVIEW_CSV_FIELDS, rows);

    fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    info!("✓ CSV 文件已保存: {}", path.display());
    Ok(())
}

/// 读取抓取结果文件
pub async fn load_fetch_output(path: &Path) -> AppResult<FetchOutput> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(display.clone(), e))?;

    serde_json::from_str(&content).map_err(|source| {
        AppError::File(FileError::JsonParseFailed {
            path: display,
            source,
        })
    })
}

/// 在输出目录中查找最近修改的 `reviews_*.json`
///
/// 目录不存在或没有匹配文件时返回 `None`
pub async fn find_latest_reviews_file(output_dir: &Path) -> Result<Option<PathBuf>> {
    let pattern = Regex::new(r"^reviews_.+\.json$")?;

    let mut entries = match fs::read_dir(output_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("无法读取文件夹: {}", output_dir.display()))
        }
    };

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.is_match(name));
        if !matches {
            continue;
        }

        let modified = entry
            .metadata()
            .await
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        if latest.as_ref().map_or(true, |(best, _)| modified > *best) {
            latest = Some((modified, path));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

/// 分类结果文件 `{summary, reviews}`
#[derive(Serialize)]
struct ClassifiedOutput<'a> {
    summary: &'a ClassificationSummary,
    reviews: &'a [ClassifiedReview],
}

/// 保存分类结果 JSON 与 CSV，返回两个文件路径
pub async fn save_classified(
    output_dir: &Path,
    summary: &ClassificationSummary,
    rows: &[ClassifiedReview],
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

    let json_path = output_dir.join(CLASSIFIED_JSON);
    write_pretty_json(&json_path, &ClassifiedOutput { summary, reviews: rows }).await?;
    info!("分类结果已保存到: {}", json_path.display());

    let csv_path = output_dir.join(CLASSIFIED_CSV);
    let content = if rows.is_empty() {
        String::new()
    } else {
        render_csv(
            &ClassifiedReview::COLUMNS,
            rows.iter().map(ClassifiedReview::csv_cells),
        )
    };
    fs::write(&csv_path, content)
        .await
        .map_err(|e| AppError::file_write_failed(csv_path.display().to_string(), e))?;
    info!("CSV 文件已保存到: {}", csv_path.display());

    Ok((json_path, csv_path))
}

async fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}

/// 取评论的一个 CSV 单元格，`author_xxx` 从作者子对象读取
fn review_cell(review: &Review, field: &str) -> String {
    let value = match field.strip_prefix("author_") {
        Some(key) => review.author().and_then(|author| author.get(key)),
        None => review.get(field),
    };
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// 生成带 BOM 的 CSV 文本
fn render_csv<I>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut out = String::from(UTF8_BOM);
    out.push_str(&header.join(","));
    out.push_str("\r\n");

    for row in rows {
        let line: Vec<String> = row.iter().map(|cell| escape_csv(cell)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

/// 含逗号、引号或换行的字段加引号
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
