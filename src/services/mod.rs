pub mod aggregate;
pub mod classifier;
pub mod fetch_session;
pub mod progress;
pub mod retry;
pub mod storage;

pub use aggregate::{summarize, ClassificationSummary, FetchStats};
pub use classifier::{classify_all, classify_review};
pub use fetch_session::FetchSession;
pub use progress::{FetchProgress, ProgressBarObserver};
pub use retry::{retry_with_backoff, RetryPolicy};
