use thiserror::Error;

/// Failures that stop a run before any request is issued.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("URL source '{location}' is unavailable: {reason}")]
    SourceUnavailable { location: String, reason: String },
    #[error("URL source '{location}' contained no usable paths.")]
    EmptySourceList { location: String },
    #[error("Invalid target URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Why a local or remote source could not be read.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source}")]
    Read {
        #[source]
        source: std::io::Error,
    },
    #[error("{source}")]
    Fetch {
        #[source]
        source: reqwest::Error,
    },
    #[error("server responded with status {status}")]
    Status { status: u16 },
}
