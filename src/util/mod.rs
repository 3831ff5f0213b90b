//! Shared utilities for `issue_tracker`.
//!
//! - ID generation and shape checks
//! - Timestamp formatting (RFC3339, milliseconds)
//! - Loose boolean parsing for form, query and env values

pub mod id;
pub mod time;

pub use id::{IdGenerator, is_valid_id_format};
pub use time::{format_timestamp, now_millis, parse_exact_timestamp, parse_timestamp};

/// Parse the boolean spellings accepted from query strings, forms and env vars.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
