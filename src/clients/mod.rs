pub mod steam_client;

pub use steam_client::SteamClient;

use crate::error::ApiError;
use crate::models::ReviewPage;
use async_trait::async_trait;

/// 评论列表数据源
///
/// 分页引擎只依赖这一能力：给定游标，返回一页数据
#[async_trait]
pub trait ReviewSource {
    /// 获取游标对应的一页
    async fn fetch_page(&self, cursor: &str) -> Result<ReviewPage, ApiError>;
}
