use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderName, HeaderValue};
use url::Url;

use crate::args::{HttpMethod, PositiveU64, PositiveUsize};
use crate::error::ValidationError;

/// Everything a load test needs, validated once and never mutated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Validated `http(s)://host[...]` URL, kept verbatim so suffixes concatenate onto it.
    pub base_url: String,
    pub targets: TargetMode,
    pub bound: RunBound,
    pub concurrency: PositiveUsize,
    pub request_timeout: Duration,
    pub method: HttpMethod,
    pub body: Option<Bytes>,
    pub header: Option<RequestHeader>,
    pub keep_alive: bool,
}

/// Which URLs a run targets.
#[derive(Debug, Clone)]
pub enum TargetMode {
    /// Hammer `base_url` only.
    Single,
    /// Spread requests over `base_url` + each suffix.
    List(SuffixSource),
}

/// When a run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBound {
    /// Issue exactly this many requests across all workers.
    Requests(PositiveU64),
    /// Issue one request per resolved target.
    EachTargetOnce,
    /// Keep issuing requests until this much time has passed since the run started.
    Duration(Duration),
}

#[derive(Debug, Clone)]
pub enum SuffixSource {
    Location(SourceLocation),
    Inline(Vec<String>),
}

impl fmt::Display for SuffixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuffixSource::Location(location) => location.fmt(f),
            SuffixSource::Inline(lines) => write!(f, "<{} inline entries>", lines.len()),
        }
    }
}

/// A local file or a remote document, picked by URL scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(Url),
}

impl SourceLocation {
    /// Treats `http://` and `https://` values as remote, everything else as a path.
    ///
    /// # Errors
    ///
    /// Returns an error when a remote-looking value is not a valid URL.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|err| ValidationError::InvalidUrl {
                url: trimmed.to_owned(),
                source: err,
            })?;
            return Ok(SourceLocation::Remote(url));
        }
        Ok(SourceLocation::Local(PathBuf::from(trimmed)))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
            SourceLocation::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// One extra request header, validated up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub name: HeaderName,
    pub value: HeaderValue,
}

impl RequestHeader {
    /// # Errors
    ///
    /// Returns an error when the name or value is not a legal HTTP header.
    pub fn parse(name: &str, value: &str) -> Result<Self, ValidationError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            ValidationError::InvalidHeaderName {
                header: name.to_owned(),
                source: err,
            }
        })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|err| ValidationError::InvalidHeaderValue {
                header: name.to_owned(),
                source: err,
            })?;
        Ok(Self {
            name: header_name,
            value: header_value,
        })
    }
}

/// Checks that `value` is an absolute `http`/`https` URL with a host.
///
/// # Errors
///
/// Returns an error describing why the URL is unusable.
pub fn validate_base_url(value: &str) -> Result<Url, ValidationError> {
    let parsed = Url::parse(value).map_err(|err| ValidationError::InvalidUrl {
        url: value.to_owned(),
        source: err,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedUrlScheme {
            url: value.to_owned(),
        });
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::UrlMissingHost);
    }
    Ok(parsed)
}
