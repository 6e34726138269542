use std::collections::BTreeMap;
use std::time::Duration;

use super::stats::{median, millis, per_second, phase_stats};
use super::types::{FailureKind, ResultMetrics, Sample, SampleOutcome};

/// Reduces every sample of a run into one summary.
///
/// Phase statistics use successful samples only; the DNS median covers all of
/// them. Sample order does not matter.
#[must_use]
pub fn aggregate(samples: &[Sample], elapsed: Duration) -> ResultMetrics {
    let successful: Vec<&Sample> = samples.iter().filter(|sample| sample.is_success()).collect();
    let phase = |pick: fn(&Sample) -> Duration| {
        let values: Vec<Duration> = successful.iter().map(|sample| pick(sample)).collect();
        phase_stats(&values)
    };

    let dns: Vec<Duration> = samples.iter().map(|sample| sample.dns).collect();

    let mut failed_requests: u64 = 0;
    let mut timed_out_requests: u64 = 0;
    let mut response_bytes: u64 = 0;
    let mut status_codes: BTreeMap<u16, u64> = BTreeMap::new();
    for sample in samples {
        match sample.outcome {
            SampleOutcome::Completed {
                status,
                response_bytes: bytes,
            } => {
                let entry = status_codes.entry(status).or_insert(0);
                *entry = entry.saturating_add(1);
                response_bytes = response_bytes.saturating_add(bytes);
            }
            SampleOutcome::Failed(kind) => {
                failed_requests = failed_requests.saturating_add(1);
                if kind == FailureKind::Timeout {
                    timed_out_requests = timed_out_requests.saturating_add(1);
                }
            }
        }
    }

    let total_requests = u64::try_from(samples.len()).unwrap_or(u64::MAX);

    ResultMetrics {
        tcp_connect: phase(|sample| sample.tcp_connect),
        server_processing: phase(|sample| sample.server_processing),
        content_transfer: phase(|sample| sample.content_transfer),
        total_time: phase(|sample| sample.total),
        dns_median: millis(median(&dns)),
        total_requests,
        failed_requests,
        timed_out_requests,
        requests_per_second: per_second(total_requests, elapsed),
        response_bytes,
        status_codes,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    }
}
