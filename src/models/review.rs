use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 单条评论
///
/// 服务器返回的原始对象原样保存、原样写出；这里只提供只读访问器，
/// 去重只依赖 `recommendationid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Review(Value);

impl Review {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// 原始 JSON
    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_raw(self) -> Value {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 评论唯一 ID；字符串或数字均可，空值视为缺失
    pub fn id(&self) -> Option<String> {
        match self.0.get("recommendationid")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// 评论正文
    pub fn text(&self) -> &str {
        self.0.get("review").and_then(Value::as_str).unwrap_or("")
    }

    /// 是否推荐，缺失时视为推荐
    pub fn voted_up(&self) -> bool {
        self.0.get("voted_up").map(truthy).unwrap_or(true)
    }

    pub fn votes_up(&self) -> u64 {
        self.0.get("votes_up").map(as_count).unwrap_or(0)
    }

    pub fn votes_funny(&self) -> u64 {
        self.0.get("votes_funny").map(as_count).unwrap_or(0)
    }

    /// 评论语言，缺失时为 "unknown"
    pub fn language(&self) -> &str {
        self.0
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    pub fn steam_purchase(&self) -> bool {
        self.0.get("steam_purchase").map(truthy).unwrap_or(false)
    }

    /// 创建时间（Unix 秒）
    pub fn timestamp_created(&self) -> i64 {
        self.0
            .get("timestamp_created")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// 作者信息子对象
    pub fn author(&self) -> Option<&Map<String, Value>> {
        self.0.get("author").and_then(Value::as_object)
    }

    /// 总游玩时长（分钟）
    pub fn playtime_forever(&self) -> u64 {
        self.author_field("playtime_forever")
    }

    pub fn num_games_owned(&self) -> u64 {
        self.author_field("num_games_owned")
    }

    fn author_field(&self, key: &str) -> u64 {
        self.author()
            .and_then(|author| author.get(key))
            .map(as_count)
            .unwrap_or(0)
    }
}

impl From<Value> for Review {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}

/// 按接口习惯把数字、数字字符串统一成计数
fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        _ => true,
    }
}
