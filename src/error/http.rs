use thiserror::Error;
use tokio_native_tls::native_tls;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build TLS connector: {source}")]
    TlsConnector {
        #[source]
        source: native_tls::Error,
    },
}

/// Why a single request attempt did not complete.
///
/// These never abort a run; the prober logs them and records a failed sample.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out")]
    Timeout,
    #[error("unsupported URL scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },
    #[error("URL is missing host")]
    MissingHost,
    #[error("failed to resolve {host}: {source}")]
    Dns {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no addresses resolved for {host}")]
    NoAddresses { host: String },
    #[error("connect failed: {source}")]
    Connect {
        #[source]
        source: std::io::Error,
    },
    #[error("TLS handshake failed: {source}")]
    Tls {
        #[source]
        source: native_tls::Error,
    },
    #[error("HTTP handshake failed: {source}")]
    Handshake {
        #[source]
        source: hyper::Error,
    },
    #[error("failed to build request: {source}")]
    BuildRequest {
        #[source]
        source: http::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: hyper::Error,
    },
    #[error("failed to read response body: {source}")]
    Body {
        #[source]
        source: hyper::Error,
    },
}

impl ProbeError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout)
    }
}
