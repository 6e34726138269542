use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::metrics::{Sample, SampleOutcome};

use super::io::IoMarks;

/// Timestamps gathered while one request is in flight.
pub(crate) struct PhaseMarks {
    start: Instant,
    pub(crate) dns: Duration,
    pub(crate) tcp_connect: Duration,
    pub(crate) io: Option<Arc<IoMarks>>,
    pub(crate) last_byte: Option<Instant>,
}

impl PhaseMarks {
    pub(crate) const fn new(start: Instant) -> Self {
        Self {
            start,
            dns: Duration::ZERO,
            tcp_connect: Duration::ZERO,
            io: None,
            last_byte: None,
        }
    }

    /// Phases whose end marks were never reached come out as zero.
    pub(crate) fn into_sample(self, end: Instant, outcome: SampleOutcome) -> Sample {
        let io = self.io.as_ref().map(|marks| marks.snapshot()).unwrap_or_default();
        Sample {
            issued_at: self.start.into_std(),
            dns: self.dns,
            tcp_connect: self.tcp_connect,
            server_processing: span(io.request_written, io.first_byte),
            content_transfer: span(io.first_byte, self.last_byte),
            total: end.saturating_duration_since(self.start),
            outcome,
        }
    }
}

fn span(from: Option<Instant>, to: Option<Instant>) -> Duration {
    match (from, to) {
        (Some(from), Some(to)) => to.saturating_duration_since(from),
        (Some(_) | None, _) => Duration::ZERO,
    }
}
