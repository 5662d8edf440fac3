//! Structured JSON logging and the per-prediction audit line.

mod format;

pub use format::{AuditLine, StructuredLogger};
