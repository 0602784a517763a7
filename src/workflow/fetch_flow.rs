//! 分页抓取流程 - 流程层
//!
//! 核心职责：沿服务器游标逐页抓取，去重，并在以下任一条件满足时停止：
//! 1. 当前页没有数据
//! 2. 连续 3 页全是已见过的评论
//! 3. 累计数量达到首页汇总的总数
//! 4. 下一页游标缺失或与当前游标相同
//!
//! 中断与中途错误都不会丢弃已获取的数据

use crate::clients::ReviewSource;
use crate::error::ApiError;
use crate::models::{QuerySummary, Review, ReviewPage};
use crate::services::fetch_session::{FetchSession, START_CURSOR};
use crate::services::progress::FetchProgress;
use anyhow::{Context, Result};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 连续多少页全是重复数据后放弃
pub const MAX_DUPLICATE_PAGES: usize = 3;

/// 流程选项
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// 非首页请求前的等待时间
    pub page_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(500),
        }
    }
}

/// 抓取结束原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// 当前页无数据
    EmptyPage,
    /// 连续多页全是重复数据
    RepeatedDuplicates,
    /// 已达到服务器报告的总数
    GoalReached,
    /// 游标缺失或未前进
    CursorExhausted,
    /// 用户中断
    Cancelled,
    /// 中途出错，保留已获取部分
    Failed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage => write!(f, "当前页无数据"),
            StopReason::RepeatedDuplicates => {
                write!(f, "连续 {} 页没有新数据", MAX_DUPLICATE_PAGES)
            }
            StopReason::GoalReached => write!(f, "已获取所有评论"),
            StopReason::CursorExhausted => write!(f, "已到达最后一页"),
            StopReason::Cancelled => write!(f, "用户中断"),
            StopReason::Failed(msg) => write!(f, "发生错误: {}", msg),
        }
    }
}

/// 抓取结果
#[derive(Debug)]
pub struct FetchOutcome {
    /// 去重后的评论，保持抓取顺序
    pub reviews: Vec<Review>,
    pub query_summary: QuerySummary,
    pub duplicate_count: usize,
    /// 有新数据的页数
    pub pages: usize,
    pub stop_reason: StopReason,
}

impl FetchOutcome {
    fn from_session(
        session: FetchSession,
        query_summary: QuerySummary,
        stop_reason: StopReason,
    ) -> Self {
        Self {
            duplicate_count: session.duplicate_count(),
            pages: session.page_count(),
            reviews: session.into_reviews(),
            query_summary,
            stop_reason,
        }
    }

    /// 是否为不完整结果（中断或出错）
    pub fn is_partial(&self) -> bool {
        matches!(self.stop_reason, StopReason::Cancelled | StopReason::Failed(_))
    }
}

/// 获取所有评论（带去重）
///
/// 首页失败时返回错误；此后的任何错误或中断都转为部分结果
///
/// # 参数
/// - `source`: 数据源
/// - `options`: 流程选项
/// - `cancel`: 中断信号，在每次等待与请求期间检查
/// - `progress`: 可选进度观察者
pub async fn fetch_all<S>(
    source: &S,
    options: &FetchOptions,
    cancel: &CancellationToken,
    progress: Option<&dyn FetchProgress>,
) -> Result<FetchOutcome>
where
    S: ReviewSource + ?Sized,
{
    let first = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("用户中断，尚未获取任何数据");
            return Ok(FetchOutcome::from_session(
                FetchSession::new(0),
                QuerySummary::default(),
                StopReason::Cancelled,
            ));
        }
        page = source.fetch_page(START_CURSOR) => page.context("获取首页评论失败")?,
    };

    let query_summary = first.query_summary.clone().unwrap_or_default();
    log_query_summary(&query_summary);

    let mut session = FetchSession::new(query_summary.total_reviews);
    let mut pending = Some(first);

    let stop_reason = loop {
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }

        let page = match pending.take() {
            Some(page) => page,
            None => match next_page(source, session.cursor(), options.page_delay, cancel).await {
                Ok(Some(page)) => page,
                Ok(None) => break StopReason::Cancelled,
                Err(e) => {
                    error!("❌ 发生错误: {}", e);
                    break StopReason::Failed(e.to_string());
                }
            },
        };

        if page.reviews.is_empty() {
            break StopReason::EmptyPage;
        }

        let page_size = page.reviews.len();
        let stats = session.ingest(page.reviews);

        if stats.new == 0 {
            warn!(
                "⚠️ 第 {} 页全是重复数据 ({} 条)",
                session.page_count() + 1,
                page_size
            );
            if session.no_new_rounds() >= MAX_DUPLICATE_PAGES {
                break StopReason::RepeatedDuplicates;
            }
        } else {
            match progress {
                Some(observer) => observer.on_progress(session.fetched(), session.total_expected()),
                None => info!(
                    "第 {} 页: 新增 {} 条，重复 {} 条 (累计: {}/{})",
                    session.page_count(),
                    stats.new,
                    stats.duplicates,
                    session.fetched(),
                    session.total_expected()
                ),
            }
        }

        if session.goal_reached() {
            break StopReason::GoalReached;
        }

        if !session.advance(page.cursor.as_deref()) {
            break StopReason::CursorExhausted;
        }
    };

    if let Some(observer) = progress {
        observer.finish();
    }

    match &stop_reason {
        StopReason::Cancelled => warn!("⏹ 用户中断，保存已获取的数据..."),
        StopReason::Failed(_) => warn!("保存已获取的数据..."),
        StopReason::GoalReached => info!("✓ {} ({} 条)", stop_reason, session.fetched()),
        other => info!("✓ {}，抓取结束", other),
    }
    info!("去重统计: 发现 {} 条重复评论", session.duplicate_count());

    Ok(FetchOutcome::from_session(session, query_summary, stop_reason))
}

/// 等待页间延迟后请求下一页；期间收到中断返回 `None`
async fn next_page<S>(
    source: &S,
    cursor: &str,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<Option<ReviewPage>, ApiError>
where
    S: ReviewSource + ?Sized,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(None),
        _ = sleep(delay) => {}
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Ok(None),
        page = source.fetch_page(cursor) => page.map(Some),
    }
}

fn log_query_summary(summary: &QuerySummary) {
    info!("评论总数: {}", summary.total_reviews);
    info!("好评数: {}", summary.total_positive);
    info!("差评数: {}", summary.total_negative);
    info!("评分: {}\n", summary.score_desc());
}
