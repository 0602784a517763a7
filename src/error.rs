use serde_json::Value;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 评论列表接口错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（已耗尽重试次数）
    #[error("API请求失败 ({endpoint})，已尝试 {attempts} 次: {source}")]
    Transport {
        endpoint: String,
        attempts: usize,
        #[source]
        source: reqwest::Error,
    },
    /// HTTP 状态码异常
    #[error("API返回异常状态码 ({endpoint}): {status}")]
    Http {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    /// 响应体不是合法 JSON
    #[error("JSON解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 接口返回 success != 1，附带原始载荷
    #[error("API 返回失败: {payload}")]
    Rejected { payload: Value },
}

impl ApiError {
    /// 传输层错误可以重试，应用层拒绝不可以
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Rejected { .. })
    }

    /// 重试耗尽后记录实际尝试次数
    pub fn with_attempts(self, count: usize) -> Self {
        match self {
            ApiError::Transport {
                endpoint, source, ..
            } => ApiError::Transport {
                endpoint,
                attempts: count,
                source,
            },
            other => other,
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 输出目录中没有抓取结果
    #[error("未找到评论数据文件 (目录: {dir})")]
    NoReviewsFile { dir: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 文件内容无法解析
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// TOML 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 数值超出允许范围
    #[error("配置项 {key} 的值无效: {value}")]
    InvalidValue { key: &'static str, value: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
