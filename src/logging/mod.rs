//! Tracing setup and structured decision lines.

mod format;

pub use format::{DecisionLine, StructuredLogger};
