pub mod fetch_flow;

pub use fetch_flow::{fetch_all, FetchOptions, FetchOutcome, StopReason};
