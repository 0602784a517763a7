//! 抓取会话状态 - 业务能力层
//!
//! 一次抓取运行中的全部可变状态：游标、已收集评论、已见 ID、重复计数

use crate::models::Review;
use std::collections::HashSet;

/// 初始游标
pub const START_CURSOR: &str = "*";

/// 单页去重统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    pub new: usize,
    pub duplicates: usize,
}

/// 抓取会话
///
/// 不变量：`seen_ids` 与 `reviews` 中的 ID 一一对应
#[derive(Debug)]
pub struct FetchSession {
    cursor: String,
    reviews: Vec<Review>,
    seen_ids: HashSet<String>,
    duplicate_count: usize,
    no_new_rounds: usize,
    total_expected: u64,
    page_count: usize,
}

impl FetchSession {
    /// 创建新会话
    ///
    /// # 参数
    /// - `total_expected`: 首页汇总给出的评论总数
    pub fn new(total_expected: u64) -> Self {
        Self {
            cursor: START_CURSOR.to_string(),
            reviews: Vec::new(),
            seen_ids: HashSet::new(),
            duplicate_count: 0,
            no_new_rounds: 0,
            total_expected,
            page_count: 0,
        }
    }

    /// 收入一页评论，已见过或缺少 ID 的记为重复
    pub fn ingest(&mut self, page: Vec<Review>) -> PageStats {
        let mut stats = PageStats::default();

        for review in page {
            match review.id() {
                Some(id) if !self.seen_ids.contains(&id) => {
                    self.seen_ids.insert(id);
                    self.reviews.push(review);
                    stats.new += 1;
                }
                _ => stats.duplicates += 1,
            }
        }

        self.duplicate_count += stats.duplicates;
        if stats.new == 0 {
            self.no_new_rounds += 1;
        } else {
            self.no_new_rounds = 0;
            self.page_count += 1;
        }

        stats
    }

    /// 已收集数量达到服务器报告的总数
    pub fn goal_reached(&self) -> bool {
        self.reviews.len() as u64 >= self.total_expected
    }

    /// 移动到下一页游标；缺失或与当前相同时返回 false
    pub fn advance(&mut self, next: Option<&str>) -> bool {
        match next {
            Some(next) if !next.is_empty() && next != self.cursor => {
                self.cursor = next.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn fetched(&self) -> usize {
        self.reviews.len()
    }

    pub fn total_expected(&self) -> u64 {
        self.total_expected
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    /// 连续全重复页数
    pub fn no_new_rounds(&self) -> usize {
        self.no_new_rounds
    }

    /// 有新数据的页数
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// 结束会话，交出已收集的评论
    pub fn into_reviews(self) -> Vec<Review> {
        self.reviews
    }
}
