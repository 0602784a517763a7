use serde::{Deserialize, Serialize};

/// 情感倾向，直接取自评论的推荐标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// 好评
    Positive,
    /// 差评
    Negative,
}

impl Sentiment {
    pub fn from_voted_up(voted_up: bool) -> Self {
        if voted_up {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Sentiment::Positive => "好评",
            Sentiment::Negative => "差评",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 处理优先级，P0 最紧急
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    /// 按紧急程度排列
    pub const ALL: [Priority; 4] = [Priority::P0, Priority::P1, Priority::P2, Priority::P3];

    /// 分数到等级的映射：≥50 / ≥30 / ≥15 / 其余
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 50 => Priority::P0,
            s if s >= 30 => Priority::P1,
            s if s >= 15 => Priority::P2,
            _ => Priority::P3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Priority::P0 => "P0-紧急",
            Priority::P1 => "P1-高",
            Priority::P2 => "P2-中",
            Priority::P3 => "P3-低",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 问题类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCategory {
    /// 技术问题
    Technical,
    /// 内容不足
    ContentShortage,
    /// 战斗机制
    CombatMechanics,
    /// 游戏节奏
    Pacing,
    /// 上手难度
    Onboarding,
    /// 游戏时长
    Longevity,
    /// 平衡性
    Balance,
    /// 对比竞品
    Competitors,
    /// 画面音效
    AudioVisual,
    /// UI/UX
    UiUx,
    /// 多人/联机
    Multiplayer,
    /// 价格
    Price,
    /// 其他建议（无触发词，差评兜底）
    OtherSuggestion,
    /// 纯好评（好评兜底）
    PurePraise,
}

impl IssueCategory {
    /// 参与关键词扫描的类别，顺序即输出顺序
    pub const SCANNED: [IssueCategory; 13] = [
        IssueCategory::Technical,
        IssueCategory::ContentShortage,
        IssueCategory::CombatMechanics,
        IssueCategory::Pacing,
        IssueCategory::Onboarding,
        IssueCategory::Longevity,
        IssueCategory::Balance,
        IssueCategory::Competitors,
        IssueCategory::AudioVisual,
        IssueCategory::UiUx,
        IssueCategory::Multiplayer,
        IssueCategory::Price,
        IssueCategory::OtherSuggestion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IssueCategory::Technical => "技术问题",
            IssueCategory::ContentShortage => "内容不足",
            IssueCategory::CombatMechanics => "战斗机制",
            IssueCategory::Pacing => "游戏节奏",
            IssueCategory::Onboarding => "上手难度",
            IssueCategory::Longevity => "游戏时长",
            IssueCategory::Balance => "平衡性",
            IssueCategory::Competitors => "对比竞品",
            IssueCategory::AudioVisual => "画面音效",
            IssueCategory::UiUx => "UI/UX",
            IssueCategory::Multiplayer => "多人/联机",
            IssueCategory::Price => "价格",
            IssueCategory::OtherSuggestion => "其他建议",
            IssueCategory::PurePraise => "纯好评",
        }
    }

    /// 触发词，按优先顺序排列；兜底类别为空
    ///
    /// 与小写化后的正文做子串匹配，所以含大写字母的触发词（"UI"）实际上不会命中
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            IssueCategory::Technical => &[
                "崩溃", "闪退", "卡顿", "掉帧", "crash", "bug", "卡死", "黑屏", "无法", "不能",
                "fps", "延迟", "卡屏",
            ],
            IssueCategory::ContentShortage => &[
                "内容少", "内容不足", "太少", "缺少", "职业少", "技能少", "装备少", "道具少",
                "单调", "重复", "没有新意",
            ],
            IssueCategory::CombatMechanics => &[
                "战斗", "机制", "复杂", "难懂", "不平衡", "克制", "猜拳", "石头剪刀布", "霸体",
                "破势", "格防", "韧性",
            ],
            IssueCategory::Pacing => &[
                "节奏", "慢", "浪费时间", "转场", "动画", "太长", "冗长", "等待",
            ],
            IssueCategory::Onboarding => &[
                "新手", "教程", "难", "不友好", "复杂", "看不懂", "学习曲线",
            ],
            IssueCategory::Longevity => &[
                "太短", "结束", "快", "局外", "养成", "重玩性", "roguelike",
            ],
            IssueCategory::Balance => &["平衡", "太强", "太弱", "op", "imba", "不公平", "运气"],
            IssueCategory::Competitors => &["背包乱斗", "backpack", "大巴扎", "不如"],
            IssueCategory::AudioVisual => &["画面", "音效", "音乐", "美术", "建模", "特效", "视觉"],
            IssueCategory::UiUx => &["界面", "UI", "操作", "交互", "提示", "说明"],
            IssueCategory::Multiplayer => &["联机", "多人", "pvp", "匹配", "对战"],
            IssueCategory::Price => &["价格", "贵", "便宜", "性价比", "值得", "不值"],
            IssueCategory::OtherSuggestion | IssueCategory::PurePraise => &[],
        }
    }

    /// 高严重度类别的优先级加分
    pub fn severity_bonus(self) -> Option<i32> {
        match self {
            IssueCategory::Technical => Some(25),
            IssueCategory::ContentShortage => Some(15),
            IssueCategory::CombatMechanics | IssueCategory::Onboarding => Some(10),
            _ => None,
        }
    }

    pub fn is_high_severity(self) -> bool {
        self.severity_bonus().is_some()
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 单条评论的分类结果
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub sentiment: Sentiment,
    /// 至少一个类别
    pub issues: Vec<IssueCategory>,
    pub priority: Priority,
    pub score: i32,
    pub tags: Vec<&'static str>,
    /// 最多 3 句
    pub key_points: Vec<String>,
    /// 游玩时长（小时，保留 1 位）
    pub playtime_hours: f64,
    pub votes: u64,
    pub language: String,
}

/// 分类输出的一行，字段顺序即 CSV 列顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReview {
    #[serde(rename = "ID")]
    pub id: usize,
    pub recommendationid: Option<String>,
    pub timestamp: String,
    pub sentiment: String,
    pub priority: String,
    pub issues: String,
    pub tags: String,
    pub language: String,
    pub playtime_hours: f64,
    pub votes_up: u64,
    pub votes_funny: u64,
    pub review_text: String,
    pub key_points: String,
    pub steam_purchase: String,
    pub author_games_owned: u64,
}

impl ClassifiedReview {
    /// CSV 表头
    pub const COLUMNS: [&'static str; 15] = [
        "ID",
        "recommendationid",
        "timestamp",
        "sentiment",
        "priority",
        "issues",
        "tags",
        "language",
        "playtime_hours",
        "votes_up",
        "votes_funny",
        "review_text",
        "key_points",
        "steam_purchase",
        "author_games_owned",
    ];

    /// 与 `COLUMNS` 一一对应的单元格
    pub fn csv_cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.recommendationid.clone().unwrap_or_default(),
            self.timestamp.clone(),
            self.sentiment.clone(),
            self.priority.clone(),
            self.issues.clone(),
            self.tags.clone(),
            self.language.clone(),
            self.playtime_hours.to_string(),
            self.votes_up.to_string(),
            self.votes_funny.to_string(),
            self.review_text.clone(),
            self.key_points.clone(),
            self.steam_purchase.clone(),
            self.author_games_owned.to_string(),
        ]
    }
}
