//! 统计汇总服务 - 业务能力层
//!
//! 只做计数，不关心评论如何被抓取或分类

use crate::models::{ClassifiedReview, Priority, Review};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 分类汇总，键名与输出文件一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    #[serde(rename = "总评论数")]
    pub total: usize,
    #[serde(rename = "好评数")]
    pub positive: usize,
    #[serde(rename = "差评数")]
    pub negative: usize,
    /// 按 P0 → P3 排列，只包含出现过的等级
    #[serde(rename = "优先级分布", with = "crate::models::ordered")]
    pub priority_distribution: Vec<(String, usize)>,
    /// 一条评论可计入多个类别，按数量降序
    #[serde(rename = "问题类型统计", with = "crate::models::ordered")]
    pub issue_counts: Vec<(String, usize)>,
    /// 按数量降序
    #[serde(rename = "语言分布", with = "crate::models::ordered")]
    pub language_distribution: Vec<(String, usize)>,
}

/// 汇总分类结果
pub fn summarize(rows: &[ClassifiedReview]) -> ClassificationSummary {
    let positive = rows.iter().filter(|r| r.sentiment == "好评").count();
    let negative = rows.iter().filter(|r| r.sentiment == "差评").count();

    let priority_counts = count_sorted(rows.iter().map(|r| r.priority.as_str()));
    let priority_distribution = Priority::ALL
        .iter()
        .filter_map(|p| {
            priority_counts
                .iter()
                .find(|(name, _)| name == p.name())
                .cloned()
        })
        .collect();

    ClassificationSummary {
        total: rows.len(),
        positive,
        negative,
        priority_distribution,
        issue_counts: count_sorted(rows.iter().flat_map(|r| r.issues.split(", "))),
        language_distribution: count_sorted(rows.iter().map(|r| r.language.as_str())),
    }
}

/// 抓取结束后的简单统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStats {
    pub fetched: usize,
    pub positive: usize,
    pub negative: usize,
    /// 按数量降序
    pub languages: Vec<(String, usize)>,
}

impl FetchStats {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let positive = reviews.iter().filter(|r| r.voted_up()).count();
        Self {
            fetched: reviews.len(),
            positive,
            negative: reviews.len() - positive,
            languages: count_sorted(reviews.iter().map(Review::language)),
        }
    }
}

/// 计数并按数量降序排列；数量相同时保持首次出现的顺序
pub fn count_sorted<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for item in items {
        match index.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
