use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use crate::config::{RunBound, RunConfig};
use crate::error::AppResult;
use crate::metrics::Sample;

use super::probe::Prober;

/// Samples buffered between workers and the collector.
const SAMPLE_CHANNEL_CAPACITY: usize = 1024;

/// The slice `[first_index, first_index + count)` of the global request sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestShare {
    pub first_index: u64,
    pub count: u64,
}

/// Raw samples of a finished run and the wall-clock span it took.
///
/// `started_at` is taken once the prober is ready, just before the first
/// worker is spawned. A duration bound counts from there.
#[derive(Debug)]
pub struct RunOutcome {
    pub samples: Vec<Sample>,
    pub started_at: std::time::Instant,
    pub elapsed: Duration,
}

/// Splits `total` requests over `workers`: `total / workers` each, the
/// remainder going one apiece to the first workers.
#[must_use]
pub fn split_requests(total: u64, workers: usize) -> Vec<RequestShare> {
    let workers_u64 = u64::try_from(workers).unwrap_or(u64::MAX);
    let base = total.checked_div(workers_u64).unwrap_or(0);
    let remainder = total.checked_rem(workers_u64).unwrap_or(0);
    let mut next_index: u64 = 0;
    (0..workers_u64)
        .map(|worker| {
            let count = if worker < remainder {
                base.saturating_add(1)
            } else {
                base
            };
            let share = RequestShare {
                first_index: next_index,
                count,
            };
            next_index = next_index.saturating_add(count);
            share
        })
        .collect()
}

/// Runs the whole load test and returns every sample.
///
/// # Errors
///
/// Returns an error when the prober cannot be built or a worker task panics.
pub async fn coordinate(config: &RunConfig, targets: &Arc<[Url]>) -> AppResult<RunOutcome> {
    let prober = Prober::new(config)?;
    let workers = config.concurrency.get();
    let (tx, mut rx) = mpsc::channel::<Sample>(SAMPLE_CHANNEL_CAPACITY);

    let collector = tokio::spawn(async move {
        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }
        samples
    });

    let run_start = Instant::now();
    let handles: Vec<JoinHandle<()>> = match config.bound {
        RunBound::Requests(total) => {
            spawn_counted(total.get(), workers, &prober, targets, &tx)
        }
        RunBound::EachTargetOnce => {
            let total = u64::try_from(targets.len()).unwrap_or(u64::MAX);
            spawn_counted(total, workers, &prober, targets, &tx)
        }
        RunBound::Duration(duration) => {
            info!(
                "Running {} workers for {:?} against {} target(s)",
                workers,
                duration,
                targets.len()
            );
            let deadline = run_start.checked_add(duration).unwrap_or(run_start);
            (0..workers)
                .map(|worker| {
                    let prober = prober.clone();
                    let targets = Arc::clone(targets);
                    let tx = tx.clone();
                    let probe_once = worker == 0 && !duration.is_zero();
                    tokio::spawn(async move {
                        run_until(worker, probe_once, deadline, &prober, &targets, &tx).await;
                    })
                })
                .collect()
        }
    };
    drop(tx);

    try_join_all(handles).await?;
    let elapsed = run_start.elapsed();
    let samples = collector.await?;
    debug!("Collected {} samples in {:?}", samples.len(), elapsed);
    Ok(RunOutcome {
        samples,
        started_at: run_start.into_std(),
        elapsed,
    })
}

fn spawn_counted(
    total: u64,
    workers: usize,
    prober: &Prober,
    targets: &Arc<[Url]>,
    tx: &mpsc::Sender<Sample>,
) -> Vec<JoinHandle<()>> {
    info!(
        "Sending {} requests with {} workers across {} target(s)",
        total,
        workers,
        targets.len()
    );
    split_requests(total, workers)
        .into_iter()
        .map(|share| {
            let prober = prober.clone();
            let targets = Arc::clone(targets);
            let tx = tx.clone();
            tokio::spawn(async move {
                run_share(share, &prober, &targets, &tx).await;
            })
        })
        .collect()
}

async fn run_share(
    share: RequestShare,
    prober: &Prober,
    targets: &[Url],
    tx: &mpsc::Sender<Sample>,
) {
    for offset in 0..share.count {
        let index = share.first_index.saturating_add(offset);
        let Some(url) = round_robin(targets, index) else {
            break;
        };
        let sample = prober.probe(url).await;
        if tx.send(sample).await.is_err() {
            break;
        }
    }
}

/// Probes until `deadline`. With `probe_once` the first probe is issued even
/// when the deadline has already passed.
async fn run_until(
    worker: usize,
    probe_once: bool,
    deadline: Instant,
    prober: &Prober,
    targets: &[Url],
    tx: &mpsc::Sender<Sample>,
) {
    let mut index = u64::try_from(worker).unwrap_or(0);
    let mut pending_first = probe_once;
    while pending_first || Instant::now() < deadline {
        pending_first = false;
        let Some(url) = round_robin(targets, index) else {
            break;
        };
        let sample = prober.probe(url).await;
        if tx.send(sample).await.is_err() {
            break;
        }
        index = index.wrapping_add(1);
    }
}

/// Request `index` of the global sequence goes to `targets[index % len]`.
fn round_robin(targets: &[Url], index: u64) -> Option<&Url> {
    let len = u64::try_from(targets.len()).ok()?;
    let position = usize::try_from(index.checked_rem(len)?).ok()?;
    targets.get(position)
}
