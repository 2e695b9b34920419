//! Shared utilities for blackbox.
//!
//! - Logging setup with tracing
//! - Standard config/data/log locations
//! - RAII-based timing for operation measurement

pub mod log;
pub mod path;
pub mod timing;

pub use log::{LogConfig, LogLevel};
pub use timing::TimingGuard;
