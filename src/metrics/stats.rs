use std::time::Duration;

use super::types::PhaseStats;

const P95_PERCENT: u64 = 95;

/// Sorts a copy of `values` and reduces it to mean, median and p95.
pub(crate) fn phase_stats(values: &[Duration]) -> PhaseStats {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let Some(sum) = sorted
        .iter()
        .try_fold(Duration::ZERO, |acc, value| acc.checked_add(*value))
    else {
        return PhaseStats::default();
    };
    let mean = u32::try_from(sorted.len())
        .ok()
        .and_then(|count| sum.checked_div(count))
        .unwrap_or(Duration::ZERO);
    PhaseStats {
        mean: millis(mean),
        median: millis(median_sorted(&sorted)),
        p95: millis(nearest_rank_sorted(&sorted, P95_PERCENT)),
    }
}

/// Median of an unsorted slice; zero when empty.
pub(crate) fn median(values: &[Duration]) -> Duration {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    median_sorted(&sorted)
}

/// Even counts average the two central values.
fn median_sorted(sorted: &[Duration]) -> Duration {
    let mid = sorted.len().checked_div(2).unwrap_or(0);
    let Some(upper) = sorted.get(mid).copied() else {
        return Duration::ZERO;
    };
    if sorted.len().checked_rem(2) == Some(0)
        && let Some(lower) = mid.checked_sub(1).and_then(|index| sorted.get(index))
    {
        return lower
            .checked_add(upper)
            .and_then(|pair| pair.checked_div(2))
            .unwrap_or(upper);
    }
    upper
}

/// Value at 1-based rank `ceil(percent / 100 * len)`, clamped to the last element.
pub(crate) fn nearest_rank_sorted(sorted: &[Duration], percent: u64) -> Duration {
    let Ok(len) = u64::try_from(sorted.len()) else {
        return Duration::ZERO;
    };
    let rank = percent
        .saturating_mul(len)
        .saturating_add(99)
        .checked_div(100)
        .unwrap_or(0)
        .clamp(1, len.max(1));
    usize::try_from(rank.saturating_sub(1))
        .ok()
        .and_then(|index| sorted.get(index).or_else(|| sorted.last()))
        .copied()
        .unwrap_or(Duration::ZERO)
}

#[expect(
    clippy::float_arithmetic,
    reason = "reported figures are fractional milliseconds"
)]
pub(crate) fn millis(value: Duration) -> f64 {
    value.as_secs_f64() * 1000.0
}

#[expect(
    clippy::float_arithmetic,
    reason = "throughput is a fractional rate"
)]
pub(crate) fn per_second(count: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return 0.0;
    }
    count as f64 / seconds
}
