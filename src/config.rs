use crate::error::{AppResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// 未指定时抓取的应用 ID
pub const DEFAULT_APP_ID: &str = "3081280";

/// 延迟类配置（秒）的上限
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// 程序配置文件
///
/// 键名与 `config.json` 保持一致，缺失的键使用默认值
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Steam 应用 ID
    pub app_id: String,
    /// 评论排序/过滤方式（all / recent / updated）
    pub filter: String,
    /// 语言过滤
    pub language: String,
    /// 评论类型（all / positive / negative）
    pub review_type: String,
    /// 购买类型（all / steam / non_steam_purchase）
    pub purchase_type: String,
    /// 每页数量
    pub num_per_page: u32,
    /// 只获取最近 N 天的评论
    pub day_range: Option<u32>,
    /// 显式为 false 时关闭"离题活动"过滤
    pub filter_offtopic_activity: Option<bool>,
    /// 页间延迟（秒）
    pub delay: f64,
    /// 输出目录
    pub output_dir: String,
    /// 是否同时导出 CSV
    pub export_csv: bool,
    // --- 请求配置 ---
    pub base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout: u64,
    pub max_retries: usize,
    /// 首次重试等待（秒），之后每次翻倍
    pub retry_delay: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            filter: "all".to_string(),
            language: "all".to_string(),
            review_type: "all".to_string(),
            purchase_type: "all".to_string(),
            num_per_page: 100,
            day_range: None,
            filter_offtopic_activity: None,
            delay: 0.5,
            output_dir: "output".to_string(),
            export_csv: true,
            base_url: "https://store.steampowered.com/appreviews".to_string(),
            request_timeout: 30,
            max_retries: 3,
            retry_delay: 2.0,
        }
    }
}

impl Config {
    /// 从配置文件加载，文件不存在时使用默认值
    ///
    /// `.toml` 后缀按 TOML 解析，其余按 JSON 解析
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Ok(Self::default()),
        };

        let display = path.display().to_string();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: display,
                source,
            })
        } else {
            serde_json::from_str(&content).map_err(|source| ConfigError::JsonParseFailed {
                path: display,
                source,
            })
        }
    }

    /// 加载配置文件，应用环境变量覆盖后校验
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        Ok(Self::from_file(path)?.with_env().validate()?)
    }

    /// 延迟必须是 0 到 `MAX_DELAY_SECS` 之间的有限数
    pub fn validate(self) -> Result<Self, ConfigError> {
        check_delay("delay", self.delay)?;
        check_delay("retry_delay", self.retry_delay)?;
        Ok(self)
    }

    /// 用环境变量覆盖部分配置，无法解析的值被忽略
    pub fn with_env(self) -> Self {
        Self {
            app_id: std::env::var("STEAM_APP_ID").unwrap_or(self.app_id),
            output_dir: std::env::var("REVIEWS_OUTPUT_DIR").unwrap_or(self.output_dir),
            delay: env_parse("REVIEWS_DELAY").unwrap_or(self.delay),
            export_csv: env_parse("REVIEWS_EXPORT_CSV").unwrap_or(self.export_csv),
            ..self
        }
    }

    /// 生效的查询参数（不含 cursor），顺序固定
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("json".to_string(), "1".to_string()),
            ("filter".to_string(), self.filter.clone()),
            ("language".to_string(), self.language.clone()),
            ("review_type".to_string(), self.review_type.clone()),
            ("purchase_type".to_string(), self.purchase_type.clone()),
            ("num_per_page".to_string(), self.num_per_page.to_string()),
        ];

        if let Some(days) = self.day_range.filter(|d| *d > 0) {
            params.push(("day_range".to_string(), days.to_string()));
        }

        if self.filter_offtopic_activity == Some(false) {
            params.push(("filter_offtopic_activity".to_string(), "0".to_string()));
        }

        params
    }

    pub fn page_delay(&self) -> Duration {
        secs_to_duration(self.delay)
    }

    pub fn retry_base_delay(&self) -> Duration {
        secs_to_duration(self.retry_delay)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn check_delay(key: &'static str, secs: f64) -> Result<(), ConfigError> {
    if secs.is_finite() && (0.0..=MAX_DELAY_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: secs.to_string(),
        })
    }
}

/// 未校验的值也不会 panic：越界截断，NaN 视为 0
fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_DELAY_SECS)).unwrap_or(Duration::ZERO)
}
