use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write line: {source}")]
    WriteLine {
        #[source]
        source: std::fmt::Error,
    },
    #[error("Failed to serialize metrics: {source}")]
    SerializeJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write metrics to '{path}': {source}")]
    WriteJson {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid push gateway URL '{url}': {source}")]
    InvalidGatewayUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to push metrics to '{url}': {source}")]
    PushGateway {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Push gateway '{url}' rejected metrics with status {status}.")]
    PushGatewayStatus { url: String, status: u16 },
}
