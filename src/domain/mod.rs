//! Core domain types and logic.

pub mod error;
pub mod format;
pub mod metrics;
pub mod records;
pub mod summary;
