//! # Steam Review Insight
//!
//! 抓取 Steam 游戏的全部用户评论，并按关键词规则分类、汇总
//!
//! ## 架构设计
//!
//! 本系统采用四层结构：
//!
//! ### ① 数据源层（Clients）
//! - `clients/` - 对外部接口的封装，只暴露"取一页"的能力
//! - `ReviewSource` - 分页引擎依赖的数据源抽象
//! - `SteamClient` - `appreviews` 接口客户端（带重试）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，彼此独立
//! - `FetchSession` - 去重与会话计数
//! - `classifier` - 单条评论的规则分类（纯函数）
//! - `aggregate` - 计数汇总
//! - `storage` - JSON / CSV 读写
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次完整抓取"的分页流程
//! - `fetch_all` - 游标分页、停止判断、中断与部分结果
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/fetch_job` - 抓取任务，写出抓取结果
//! - `orchestrator/classify_job` - 分类任务，写出分类结果
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ReviewSource, SteamClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ClassifiedReview, FetchOutput, Review, ReviewPage};
pub use orchestrator::{ClassifyJob, FetchJob};
pub use workflow::{fetch_all, FetchOptions, FetchOutcome, StopReason};
