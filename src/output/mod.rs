//! Output formatting
//!
//! Human-readable console summaries and the JSON results file.

pub mod json;
pub mod text;
