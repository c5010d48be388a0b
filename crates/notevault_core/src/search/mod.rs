//! Full-text query helpers.
//!
//! # Responsibility
//! - Turn free-form query text into a safe SQLite FTS5 match expression.
//! - Keep FTS syntax details out of the store's query assembly.

pub mod text;

pub use text::{build_match_expression, query_terms};
