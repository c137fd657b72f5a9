//! Utility functions for string and timestamp formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_optional, format_timestamp, truncate_string};
