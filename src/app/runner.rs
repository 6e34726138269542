use tracing::{info, warn};

use crate::config::{RunBound, RunConfig, TargetMode};
use crate::error::AppResult;
use crate::http::{coordinate, resolve_targets};
use crate::metrics::{ResultMetrics, aggregate};

/// Resolves targets, drives the workers and reduces their samples.
///
/// # Errors
///
/// Returns an error when target resolution fails or a worker task dies.
/// Failed requests are not errors; they are counted in the result.
pub async fn run_load_test(config: &RunConfig) -> AppResult<ResultMetrics> {
    let targets = resolve_targets(config).await?;
    match (&config.targets, config.bound) {
        (TargetMode::Single, RunBound::Duration(duration)) => {
            info!("Load testing {} for {:?}", config.base_url, duration);
        }
        (TargetMode::Single, RunBound::Requests(_) | RunBound::EachTargetOnce) => {
            info!("Load testing {}", config.base_url);
        }
        (TargetMode::List(source), _) => {
            info!(
                "Load testing {} paths from {} on {}",
                targets.len(),
                source,
                config.base_url
            );
        }
    }

    let outcome = coordinate(config, &targets).await?;
    let metrics = aggregate(&outcome.samples, outcome.elapsed);

    if metrics.total_requests > 0 && metrics.failed_requests == metrics.total_requests {
        warn!(
            "All {} requests failed ({} timed out).",
            metrics.total_requests, metrics.timed_out_requests
        );
    } else if metrics.failed_requests > 0 {
        warn!(
            "{} of {} requests failed.",
            metrics.failed_requests, metrics.total_requests
        );
    }
    Ok(metrics)
}
