//! Scan session state
//!
//! A [`ScanSession`] is the state of one scan surface: when the last scan
//! completed, whether a scan is in flight, and the counters reported through
//! [`ScanStats`]. The session is only ever touched under the controller's
//! lock, and the lock is never held across the domain service call.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Result of a single submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The service recorded the scan
    Accepted,
    /// Blank input, nothing happened
    Ignored,
    /// Another scan was still in flight
    RejectedConcurrent,
    /// Submitted inside the debounce window
    RejectedRateLimited,
    /// The service failed or panicked
    Failed(String),
    /// The surface was torn down before the scan could finish
    Detached,
}

impl ScanOutcome {
    /// True for the two rejection outcomes
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            ScanOutcome::RejectedConcurrent | ScanOutcome::RejectedRateLimited
        )
    }
}

/// Decision taken before calling the domain service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Ignored,
    RejectedConcurrent,
    RejectedRateLimited,
    /// Carries the trimmed id to record
    Accepted(String),
}

/// Strings shown next to the scan surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDisplay {
    pub result: Option<String>,
    pub error: Option<String>,
}

/// Snapshot of scan counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_scans: u64,
    pub total_errors: u64,
    pub rejected_concurrent: u64,
    pub rejected_rate_limited: u64,
    /// Milliseconds since the last scan completed
    pub last_scan_age_ms: Option<u64>,
    pub is_processing: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ScanSession {
    last_accepted_at: Option<Instant>,
    processing: bool,
    total_scans: u64,
    total_errors: u64,
    rejected_concurrent: u64,
    rejected_rate_limited: u64,
}

impl ScanSession {
    /// Decide whether `value` may be sent to the service at `now`
    ///
    /// An accepted value flips the session into processing. Rejections leave
    /// every field except the rejection counters untouched.
    pub(crate) fn admit(&mut self, value: &str, now: Instant, debounce: Duration) -> Admission {
        let id = value.trim();
        if id.is_empty() {
            return Admission::Ignored;
        }

        if self.processing {
            self.rejected_concurrent += 1;
            return Admission::RejectedConcurrent;
        }

        if let Some(last) = self.last_accepted_at {
            if now.saturating_duration_since(last) < debounce {
                self.rejected_rate_limited += 1;
                return Admission::RejectedRateLimited;
            }
        }

        self.processing = true;
        self.total_scans += 1;
        Admission::Accepted(id.to_string())
    }

    /// Leave processing and stamp the completion time
    pub(crate) fn complete(&mut self, now: Instant) {
        self.processing = false;
        self.last_accepted_at = Some(now);
    }

    pub(crate) fn record_error(&mut self) {
        self.total_errors += 1;
    }

    pub(crate) fn is_processing(&self) -> bool {
        self.processing
    }

    pub(crate) fn stats(&self, now: Instant) -> ScanStats {
        ScanStats {
            total_scans: self.total_scans,
            total_errors: self.total_errors,
            rejected_concurrent: self.rejected_concurrent,
            rejected_rate_limited: self.rejected_rate_limited,
            last_scan_age_ms: self
                .last_accepted_at
                .map(|at| now.saturating_duration_since(at).as_millis() as u64),
            is_processing: self.processing,
        }
    }
}
