//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层把一次命令行调用串成完整任务，只做调度、落盘与统计输出。
//!
//! ## 模块划分
//!
//! ### `fetch_job` - 抓取任务
//! - 根据配置创建 `SteamClient`
//! - 调用分页引擎获取全部评论
//! - 写出 `reviews_{app_id}_{timestamp}.json/.csv`
//! - 输出抓取统计
//!
//! ### `classify_job` - 分类任务
//! - 定位最新的抓取结果文件
//! - 逐条分类并汇总
//! - 写出 `classified_reviews.json/.csv`
//!
//! ## 层次关系
//!
//! ```text
//! fetch_job / classify_job
//!     ↓
//! workflow::fetch_all (分页、去重、停止判断)
//!     ↓
//! services (能力层：classifier / aggregate / storage / retry)
//!     ↓
//! clients (数据源：SteamClient)
//! ```

pub mod classify_job;
pub mod fetch_job;

// 重新导出主要类型
pub use classify_job::ClassifyJob;
pub use fetch_job::{FetchJob, FetchReport};
