//! Utility functions for string and currency formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_amount, format_signed_amount, truncate_string};
