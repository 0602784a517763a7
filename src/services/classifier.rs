//! 评论分类服务 - 业务能力层
//!
//! 纯函数：一条评论进，一条分类结果出，不做 I/O，不共享状态

use crate::models::{Classification, ClassifiedReview, IssueCategory, Priority, Review, Sentiment};
use chrono::{Local, TimeZone};

/// 正面情绪词，命中任一即打"正面反馈"
const POSITIVE_KEYWORDS: [&str; 16] = [
    "好玩", "有趣", "推荐", "喜欢", "优秀", "精致", "流畅", "创新", "期待", "潜力", "不错", "可以",
    "good", "fun", "great", "nice",
];

/// 负面情绪词，命中任一即打"负面反馈"
const NEGATIVE_KEYWORDS: [&str; 13] = [
    "不推荐", "差", "烂", "垃圾", "失望", "后悔", "退款", "bad", "terrible", "boring", "无聊",
    "浪费", "不值",
];

/// 固定短语检查：(触发词, 标签)，彼此独立
const PHRASE_TAGS: [(&[&str], &str); 5] = [
    (&["建议", "suggest"], "有建议"),
    (&["期待", "希望"], "有期待"),
    (&["mod"], "需要MOD"),
    (&["退款", "refund"], "退款风险"),
    (&["更新", "update"], "期待更新"),
];

const NEUTRAL_TAG: &str = "一般评价";
const NO_KEY_POINTS: &str = "无特殊要点";
const SENTENCE_TERMINATORS: [char; 4] = ['。', '！', '？', '\n'];
const MAX_KEY_POINTS: usize = 3;
/// 每个类别只用前几个触发词找关键句
const KEY_POINT_KEYWORDS: usize = 5;
const REVIEW_TEXT_LIMIT: usize = 500;

/// 分类单条评论
pub fn classify_review(review: &Review) -> Classification {
    let text = review.text().to_lowercase();
    let voted_up = review.voted_up();
    let votes = review.votes_up();
    let playtime_hours = review.playtime_forever() as f64 / 60.0;

    let issues = match_issues(&text, voted_up);
    let score = priority_score(votes, playtime_hours, &issues, voted_up);

    Classification {
        sentiment: Sentiment::from_voted_up(voted_up),
        priority: Priority::from_score(score),
        score,
        tags: extract_tags(&text),
        key_points: extract_key_points(&text, &issues),
        issues,
        playtime_hours: (playtime_hours * 10.0).round() / 10.0,
        votes,
        language: review.language().to_string(),
    }
}

/// 问题类别匹配；全部未命中时按情感给兜底类别
fn match_issues(text: &str, voted_up: bool) -> Vec<IssueCategory> {
    let mut issues: Vec<IssueCategory> = IssueCategory::SCANNED
        .iter()
        .copied()
        .filter(|category| category.keywords().iter().any(|kw| text.contains(kw)))
        .collect();

    if issues.is_empty() {
        issues.push(if voted_up {
            IssueCategory::PurePraise
        } else {
            IssueCategory::OtherSuggestion
        });
    }

    issues
}

/// 优先级分数：投票、时长、严重问题、差评四项相加
pub fn priority_score(
    votes: u64,
    playtime_hours: f64,
    issues: &[IssueCategory],
    voted_up: bool,
) -> i32 {
    let mut score = match votes {
        v if v >= 50 => 30,
        v if v >= 20 => 20,
        v if v >= 10 => 10,
        v if v >= 5 => 5,
        _ => 0,
    };

    score += if playtime_hours >= 20.0 {
        15
    } else if playtime_hours >= 10.0 {
        10
    } else if playtime_hours >= 5.0 {
        5
    } else if playtime_hours < 1.0 {
        -10
    } else {
        0
    };

    score += issues
        .iter()
        .filter_map(|issue| issue.severity_bonus())
        .sum::<i32>();

    if !voted_up {
        score += 10;
    }

    score
}

fn extract_tags(text: &str) -> Vec<&'static str> {
    let mut tags = Vec::new();

    if POSITIVE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        tags.push("正面反馈");
    }
    if NEGATIVE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        tags.push("负面反馈");
    }

    for (triggers, tag) in PHRASE_TAGS {
        if triggers.iter().any(|kw| text.contains(kw)) {
            tags.push(tag);
        }
    }

    if tags.is_empty() {
        tags.push(NEUTRAL_TAG);
    }
    tags
}

/// 从正文中挑出提到严重问题的短句
fn extract_key_points(text: &str, issues: &[IssueCategory]) -> Vec<String> {
    let severe: Vec<IssueCategory> = issues
        .iter()
        .copied()
        .filter(|issue| issue.is_high_severity())
        .collect();

    let mut points = Vec::new();

    for sentence in text.split(SENTENCE_TERMINATORS).map(str::trim) {
        let len = sentence.chars().count();
        if len < 10 || len >= 100 {
            continue;
        }

        let mentions_issue = severe.iter().any(|issue| {
            issue
                .keywords()
                .iter()
                .take(KEY_POINT_KEYWORDS)
                .any(|kw| sentence.contains(kw))
        });

        if mentions_issue {
            points.push(sentence.to_string());
            if points.len() >= MAX_KEY_POINTS {
                break;
            }
        }
    }

    if points.is_empty() {
        points.push(NO_KEY_POINTS.to_string());
    }
    points
}

/// 分类全部评论，生成输出行（ID 从 1 开始）
pub fn classify_all(reviews: &[Review]) -> Vec<ClassifiedReview> {
    reviews
        .iter()
        .enumerate()
        .map(|(idx, review)| to_row(idx + 1, review, &classify_review(review)))
        .collect()
}

fn to_row(id: usize, review: &Review, classification: &Classification) -> ClassifiedReview {
    ClassifiedReview {
        id,
        recommendationid: review.id(),
        timestamp: format_timestamp(review.timestamp_created()),
        sentiment: classification.sentiment.name().to_string(),
        priority: classification.priority.name().to_string(),
        issues: join_names(classification.issues.iter().map(|i| i.name()), ", "),
        tags: classification.tags.join(", "),
        language: classification.language.clone(),
        playtime_hours: classification.playtime_hours,
        votes_up: classification.votes,
        votes_funny: review.votes_funny(),
        review_text: review.text().chars().take(REVIEW_TEXT_LIMIT).collect(),
        key_points: classification.key_points.join(" | "),
        steam_purchase: if review.steam_purchase() { "是" } else { "否" }.to_string(),
        author_games_owned: review.num_games_owned(),
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>, sep: &str) -> String {
    names.collect::<Vec<_>>().join(sep)
}

/// Unix 秒转本地时间 `%Y-%m-%d %H:%M`
fn format_timestamp(secs: i64) -> String {
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
