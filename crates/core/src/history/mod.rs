//! Commit history access.

pub mod collector;

pub use collector::{CommitRange, HistoryCollector};
