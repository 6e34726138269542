use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;

/// One request attempt, as seen at the transport layer.
///
/// Phases the exchange never reached are zero.
#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub issued_at: Instant,
    pub dns: Duration,
    pub tcp_connect: Duration,
    pub server_processing: Duration,
    pub content_transfer: Duration,
    pub total: Duration,
    pub outcome: SampleOutcome,
}

impl Sample {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, SampleOutcome::Completed { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// A full response was read, whatever its status code.
    Completed { status: u16, response_bytes: u64 },
    Failed(FailureKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Transport,
}

/// Mean, median and 95th percentile of one phase, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PhaseStats {
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
}

/// Final summary of a run. Built once, never mutated.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResultMetrics {
    pub tcp_connect: PhaseStats,
    pub server_processing: PhaseStats,
    pub content_transfer: PhaseStats,
    /// Whole-request latency, start to last byte.
    pub total_time: PhaseStats,
    pub dns_median: f64,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub timed_out_requests: u64,
    pub requests_per_second: f64,
    /// Body bytes read across all completed responses.
    pub response_bytes: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub elapsed_ms: u64,
}
