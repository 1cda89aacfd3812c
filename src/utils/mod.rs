//! Utility modules for the pin map engine.

pub mod formatting;

// Re-export commonly used functions
pub use formatting::{format_amount, format_price_compact};
