//! 抓取进度显示
//!
//! 分页引擎只认识 `FetchProgress`；不传观察者时不显示任何进度

use indicatif::{ProgressBar, ProgressStyle};

/// 进度观察者
pub trait FetchProgress {
    /// 每收入一页新数据后调用
    ///
    /// # 参数
    /// - `fetched`: 累计获取数
    /// - `total`: 服务器报告的总数
    fn on_progress(&self, fetched: usize, total: u64);

    /// 抓取结束（无论原因）时调用
    fn finish(&self) {}
}

const BAR_TEMPLATE: &str =
    "获取评论 [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} 条 ({per_sec})";

/// 终端进度条
///
/// 总数在首页返回后才知道，所以长度在第一次更新时设置
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchProgress for ProgressBarObserver {
    fn on_progress(&self, fetched: usize, total: u64) {
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
        self.bar.set_position(fetched as u64);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
