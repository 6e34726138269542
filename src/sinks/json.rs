use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

use crate::error::{AppError, AppResult, SinkError};
use crate::metrics::ResultMetrics;

/// Target of `--json-metrics` when no file is named.
pub const DEFAULT_JSON_METRICS_FILE: &str = "out.json";

/// Writes the metrics as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when serialization or the file write fails.
pub async fn write_json_metrics(path: &Path, metrics: &ResultMetrics) -> AppResult<()> {
    let payload = serde_json::to_vec_pretty(metrics)
        .map_err(|err| AppError::sink(SinkError::SerializeJson { source: err }))?;
    let write_error = |err: std::io::Error| {
        AppError::sink(SinkError::WriteJson {
            path: path.to_path_buf(),
            source: err,
        })
    };
    let file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&payload).await.map_err(write_error)?;
    writer.write_all(b"\n").await.map_err(write_error)?;
    writer.flush().await.map_err(write_error)?;
    info!("Metrics written to {}", path.display());
    Ok(())
}
