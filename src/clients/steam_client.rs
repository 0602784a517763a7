/// Steam 评论接口客户端
///
/// 封装 `appreviews/{appid}` 的单页请求、状态检查与重试
use crate::clients::ReviewSource;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::ReviewPage;
use crate::services::retry::{retry_with_backoff, RetryPolicy};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Steam 评论客户端
pub struct SteamClient {
    http: reqwest::Client,
    endpoint: String,
    params: Vec<(String, String)>,
    retry: RetryPolicy,
}

impl SteamClient {
    /// 创建新的评论客户端
    ///
    /// # 参数
    /// - `config`: 配置（查询参数、超时、重试）
    /// - `app_id`: 应用 ID
    pub fn new(config: &Config, app_id: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            http,
            endpoint: format!("{}/{}", config.base_url.trim_end_matches('/'), app_id),
            params: config.query_params(),
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 生效的查询参数（不含 cursor）
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// 单次请求，不重试
    async fn fetch_page_once(&self, cursor: &str) -> Result<ReviewPage, ApiError> {
        debug!("请求 {} (cursor={})", self.endpoint, cursor);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.params)
            .query(&[("cursor", cursor)])
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                endpoint: self.endpoint.clone(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| self.transport_error(source))?;

        let payload: Value =
            serde_json::from_str(&body).map_err(|source| self.decode_error(source))?;
        Self::parse_page(payload).map_err(|e| match e {
            PageError::Rejected(payload) => ApiError::Rejected { payload },
            PageError::Decode(source) => self.decode_error(source),
        })
    }

    /// 检查 success 标记并解析页面
    fn parse_page(payload: Value) -> Result<ReviewPage, PageError> {
        if payload.get("success").and_then(Value::as_i64) != Some(1) {
            return Err(PageError::Rejected(payload));
        }
        serde_json::from_value(payload).map_err(PageError::Decode)
    }

    fn transport_error(&self, source: reqwest::Error) -> ApiError {
        ApiError::Transport {
            endpoint: self.endpoint.clone(),
            attempts: 1,
            source,
        }
    }

    fn decode_error(&self, source: serde_json::Error) -> ApiError {
        ApiError::Decode {
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}

enum PageError {
    Rejected(Value),
    Decode(serde_json::Error),
}

#[async_trait]
impl ReviewSource for SteamClient {
    async fn fetch_page(&self, cursor: &str) -> Result<ReviewPage, ApiError> {
        retry_with_backoff(&self.retry, &self.endpoint, || self.fetch_page_once(cursor)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_app_id() {
        let config = Config {
            base_url: "https://example.test/appreviews/".to_string(),
            ..Config::default()
        };
        let client = SteamClient::new(&config, "570").unwrap();
        assert_eq!(client.endpoint(), "https://example.test/appreviews/570");
        assert_eq!(client.params()[0], ("json".to_string(), "1".to_string()));
    }

    #[test]
    fn test_parse_page_rejects_failure_flag() {
        let payload = json!({"success": 2, "reviews": []});
        match SteamClient::parse_page(payload.clone()) {
            Err(PageError::Rejected(p)) => assert_eq!(p, payload),
            _ => panic!("success != 1 应该被拒绝"),
        }

        assert!(matches!(
            SteamClient::parse_page(json!({"reviews": []})),
            Err(PageError::Rejected(_))
        ));
    }

    #[test]
    fn test_parse_page_accepts_success() {
        let page = SteamClient::parse_page(json!({
            "success": 1,
            "reviews": [{"recommendationid": "1"}],
            "cursor": "next"
        }));
        match page {
            Ok(page) => {
                assert_eq!(page.reviews.len(), 1);
                assert_eq!(page.cursor.as_deref(), Some("next"));
            }
            Err(_) => panic!("合法页面应该解析成功"),
        }
    }
}
