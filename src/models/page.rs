use crate::models::review::Review;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 首页返回的评论汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySummary {
    /// 服务器报告的评论总数
    pub total_reviews: u64,
    pub total_positive: u64,
    pub total_negative: u64,
    /// 评分描述（如 "特别好评"）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_score_desc: Option<String>,
    /// 其余字段原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuerySummary {
    pub fn score_desc(&self) -> &str {
        self.review_score_desc.as_deref().unwrap_or("N/A")
    }
}

/// 评论列表接口的一页响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewPage {
    pub success: i64,
    pub reviews: Vec<Review>,
    /// 下一页游标
    pub cursor: Option<String>,
    /// 只有首页携带完整汇总
    pub query_summary: Option<QuerySummary>,
}

/// 抓取结果文件 `reviews_{app_id}_{timestamp}.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOutput {
    pub app_id: String,
    pub fetch_time: String,
    pub total_fetched: usize,
    pub query_summary: QuerySummary,
    /// 生效的查询参数
    #[serde(with = "crate::models::ordered")]
    pub config: Vec<(String, String)>,
    pub reviews: Vec<Review>,
}
