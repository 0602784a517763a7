pub mod classification;
pub mod ordered;
pub mod page;
pub mod review;

pub use classification::{Classification, ClassifiedReview, IssueCategory, Priority, Sentiment};
pub use page::{FetchOutput, QuerySummary, ReviewPage};
pub use review::Review;
