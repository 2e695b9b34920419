//! RAII timing for reconstruction and store operations.
//!
//! ```rust,ignore
//! use blackbox_util::TimingGuard;
//!
//! let _timing = TimingGuard::new("reconstruct", "src/Counter.java");
//! // ... work ...
//! // the duration is logged when `_timing` is dropped
//! ```

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const INFO_THRESHOLD: Duration = Duration::from_millis(250);
const WARN_THRESHOLD: Duration = Duration::from_secs(5);

/// Logs how long an operation took when dropped.
///
/// Fast operations are logged at debug level, slower ones at info, and
/// anything past the warn threshold at warn.
pub struct TimingGuard {
    operation: &'static str,
    subject: String,
    start: Instant,
}

impl TimingGuard {
    pub fn new(operation: &'static str, subject: impl Into<String>) -> Self {
        Self {
            operation,
            subject: subject.into(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let elapsed = format_duration(duration);
        let duration_ms = duration.as_millis() as u64;

        if duration >= WARN_THRESHOLD {
            warn!(
                operation = self.operation,
                subject = %self.subject,
                duration_ms,
                elapsed = %elapsed,
                "Slow operation"
            );
        } else if duration >= INFO_THRESHOLD {
            info!(
                operation = self.operation,
                subject = %self.subject,
                duration_ms,
                elapsed = %elapsed,
                "Operation finished"
            );
        } else {
            debug!(
                operation = self.operation,
                subject = %self.subject,
                duration_ms,
                "Operation finished"
            );
        }
    }
}
