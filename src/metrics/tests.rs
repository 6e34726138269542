use std::time::{Duration, Instant};

use super::stats::{median, millis, nearest_rank_sorted, phase_stats};
use super::{FailureKind, ResultMetrics, Sample, SampleOutcome, aggregate};

const EPSILON: f64 = 1e-6;

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < EPSILON
}

fn completed(server_ms: u64, status: u16) -> Sample {
    Sample {
        issued_at: Instant::now(),
        dns: Duration::from_millis(1),
        tcp_connect: Duration::from_millis(2),
        server_processing: Duration::from_millis(server_ms),
        content_transfer: Duration::from_millis(3),
        total: Duration::from_millis(server_ms.saturating_add(6)),
        outcome: SampleOutcome::Completed {
            status,
            response_bytes: 12,
        },
    }
}

fn failed(kind: FailureKind, dns_ms: u64) -> Sample {
    Sample {
        issued_at: Instant::now(),
        dns: Duration::from_millis(dns_ms),
        tcp_connect: Duration::ZERO,
        server_processing: Duration::ZERO,
        content_transfer: Duration::ZERO,
        total: Duration::from_millis(dns_ms),
        outcome: SampleOutcome::Failed(kind),
    }
}

fn millis_list(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_millis).collect()
}

#[test]
fn five_sample_scenario_matches_expected_figures() -> Result<(), String> {
    let samples: Vec<Sample> = [10, 20, 30, 40, 50]
        .into_iter()
        .map(|ms| completed(ms, 200))
        .collect();
    let metrics = aggregate(&samples, Duration::from_secs(1));

    let stats = metrics.server_processing;
    if !approx_eq(stats.mean, 30.0) || !approx_eq(stats.median, 30.0) {
        return Err(format!("Unexpected stats: {:?}", stats));
    }
    if !approx_eq(stats.p95, 50.0) {
        return Err(format!("Unexpected p95: {}", stats.p95));
    }
    if metrics.total_requests != 5 || metrics.failed_requests != 0 {
        return Err(format!("Unexpected counts: {:?}", metrics));
    }
    if !approx_eq(metrics.requests_per_second, 5.0) {
        return Err(format!("Unexpected rps: {}", metrics.requests_per_second));
    }
    Ok(())
}

#[test]
fn median_of_even_count_averages_central_values() -> Result<(), String> {
    let value = median(&millis_list(&[40, 10, 30, 20]));
    if value != Duration::from_millis(25) {
        return Err(format!("Unexpected median: {:?}", value));
    }
    if median(&[]) != Duration::ZERO {
        return Err("Expected zero median for empty input".to_owned());
    }
    Ok(())
}

#[test]
fn nearest_rank_clamps_to_bounds() -> Result<(), String> {
    let single = millis_list(&[7]);
    if nearest_rank_sorted(&single, 95) != Duration::from_millis(7) {
        return Err("Expected the only value".to_owned());
    }
    let twenty: Vec<Duration> = (1..=20).map(Duration::from_millis).collect();
    let p95 = nearest_rank_sorted(&twenty, 95);
    if p95 != Duration::from_millis(19) {
        return Err(format!("Unexpected p95 of 1..=20: {:?}", p95));
    }
    if nearest_rank_sorted(&[], 95) != Duration::ZERO {
        return Err("Expected zero for empty input".to_owned());
    }
    Ok(())
}

#[test]
fn mean_stays_within_min_and_max() -> Result<(), String> {
    let inputs: [&[u64]; 4] = [&[5], &[1, 1000], &[3, 3, 3, 4], &[9, 2, 7, 250, 31, 0]];
    for input in inputs {
        let stats = phase_stats(&millis_list(input));
        let min = millis(Duration::from_millis(input.iter().copied().min().unwrap_or(0)));
        let max = millis(Duration::from_millis(input.iter().copied().max().unwrap_or(0)));
        if stats.mean < min || stats.mean > max {
            return Err(format!("Mean {} outside [{}, {}]", stats.mean, min, max));
        }
        if stats.p95 < stats.median {
            return Err(format!("p95 below median for {:?}", input));
        }
    }
    Ok(())
}

#[test]
fn p95_does_not_decrease_when_a_new_maximum_is_added() -> Result<(), String> {
    let mut values = millis_list(&[12, 4, 18, 9, 30, 22, 15]);
    let mut previous = phase_stats(&values).p95;
    for extra in [31, 45, 90, 400] {
        values.push(Duration::from_millis(extra));
        let current = phase_stats(&values).p95;
        if current < previous {
            return Err(format!("p95 dropped from {} to {}", previous, current));
        }
        previous = current;
    }
    Ok(())
}

#[test]
fn aggregation_is_order_independent() -> Result<(), String> {
    let forward: Vec<Sample> = [5, 80, 13, 42, 7, 61]
        .into_iter()
        .map(|ms| completed(ms, 200))
        .collect();
    let mut reversed = forward.clone();
    reversed.reverse();
    let elapsed = Duration::from_millis(750);
    if aggregate(&forward, elapsed) != aggregate(&reversed, elapsed) {
        return Err("Aggregation depends on sample order".to_owned());
    }
    Ok(())
}

#[test]
fn failed_and_successful_add_up_to_total() -> Result<(), String> {
    let samples = vec![
        completed(10, 200),
        completed(20, 503),
        failed(FailureKind::Transport, 0),
        completed(30, 404),
        failed(FailureKind::Timeout, 4),
    ];
    let metrics = aggregate(&samples, Duration::from_secs(2));
    let successful: u64 = metrics.status_codes.values().sum();
    if successful.saturating_add(metrics.failed_requests) != metrics.total_requests {
        return Err(format!("Counts do not add up: {:?}", metrics));
    }
    if metrics.failed_requests != 2 || metrics.timed_out_requests != 1 {
        return Err(format!("Unexpected failures: {:?}", metrics));
    }
    if metrics.status_codes.get(&503) != Some(&1) {
        return Err("Expected 503 to count as completed".to_owned());
    }
    if !approx_eq(metrics.server_processing.median, 20.0) {
        return Err(format!(
            "Failed samples leaked into phase stats: {:?}",
            metrics.server_processing
        ));
    }
    Ok(())
}

#[test]
#[expect(clippy::float_arithmetic, reason = "throughput check")]
fn requests_per_second_times_elapsed_is_total() -> Result<(), String> {
    let samples: Vec<Sample> = (0..37).map(|ms| completed(ms, 200)).collect();
    let elapsed = Duration::from_millis(1_350);
    let metrics = aggregate(&samples, elapsed);
    let reconstructed = metrics.requests_per_second * elapsed.as_secs_f64();
    if (reconstructed - 37.0).abs() > 1e-3 {
        return Err(format!("rps * duration = {}", reconstructed));
    }
    if metrics.elapsed_ms != 1_350 {
        return Err(format!("Unexpected elapsed_ms: {}", metrics.elapsed_ms));
    }
    Ok(())
}

#[test]
fn zero_elapsed_reports_zero_throughput() -> Result<(), String> {
    let metrics = aggregate(&[completed(1, 200)], Duration::ZERO);
    if !approx_eq(metrics.requests_per_second, 0.0) {
        return Err(format!("Unexpected rps: {}", metrics.requests_per_second));
    }
    Ok(())
}

#[test]
fn all_timeouts_give_zero_statistics() -> Result<(), String> {
    let samples = vec![
        failed(FailureKind::Timeout, 0),
        failed(FailureKind::Timeout, 0),
        failed(FailureKind::Timeout, 0),
    ];
    let metrics = aggregate(&samples, Duration::from_secs(1));
    if metrics.total_requests != 3 || metrics.failed_requests != 3 {
        return Err(format!("Unexpected counts: {:?}", metrics));
    }
    let expected = ResultMetrics {
        total_requests: 3,
        failed_requests: 3,
        timed_out_requests: 3,
        requests_per_second: metrics.requests_per_second,
        elapsed_ms: 1_000,
        ..ResultMetrics::default()
    };
    if metrics != expected {
        return Err(format!("Expected zeroed statistics, got {:?}", metrics));
    }
    Ok(())
}

#[test]
fn total_time_and_bytes_cover_completed_responses() -> Result<(), String> {
    let samples = vec![
        completed(10, 200),
        completed(30, 500),
        failed(FailureKind::Timeout, 400),
    ];
    let metrics = aggregate(&samples, Duration::from_secs(1));
    if !approx_eq(metrics.total_time.median, 26.0) || !approx_eq(metrics.total_time.p95, 36.0) {
        return Err(format!("Unexpected total time: {:?}", metrics.total_time));
    }
    if metrics.response_bytes != 24 {
        return Err(format!("Unexpected byte count: {}", metrics.response_bytes));
    }
    Ok(())
}

#[test]
fn dns_median_includes_failed_samples() -> Result<(), String> {
    let samples = vec![
        completed(10, 200),
        failed(FailureKind::Transport, 9),
        failed(FailureKind::Transport, 11),
    ];
    let metrics = aggregate(&samples, Duration::from_secs(1));
    if !approx_eq(metrics.dns_median, 9.0) {
        return Err(format!("Unexpected dns median: {}", metrics.dns_median));
    }
    Ok(())
}

#[test]
fn result_metrics_serialize_with_phase_objects() -> Result<(), String> {
    let metrics = aggregate(&[completed(10, 200)], Duration::from_secs(1));
    let value = serde_json::to_value(&metrics).map_err(|err| err.to_string())?;
    let p95 = value
        .get("server_processing")
        .and_then(|phase| phase.get("p95"))
        .and_then(serde_json::Value::as_f64);
    if p95.is_none_or(|p95| !approx_eq(p95, 10.0)) {
        return Err(format!("Unexpected JSON: {}", value));
    }
    if value.get("status_codes").and_then(|codes| codes.get("200")).is_none() {
        return Err(format!("Missing status codes: {}", value));
    }
    Ok(())
}
