use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::args::DEFAULT_USER_AGENT;
use crate::config::SourceLocation;
use crate::error::SourceError;

/// Upper bound for fetching a remote suffix list or body file.
const REMOTE_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads the whole content of a local file or a remote `http(s)` document.
///
/// Remote sources must answer with a 2xx status.
///
/// # Errors
///
/// Returns an error when the file cannot be read or the fetch fails.
pub async fn read_source(location: &SourceLocation) -> Result<Bytes, SourceError> {
    match location {
        SourceLocation::Local(path) => {
            debug!("Reading {}", path.display());
            tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|err| SourceError::Read { source: err })
        }
        SourceLocation::Remote(url) => {
            debug!("Fetching {}", url);
            let client = reqwest::Client::builder()
                .user_agent(DEFAULT_USER_AGENT)
                .timeout(REMOTE_SOURCE_TIMEOUT)
                .build()
                .map_err(|err| SourceError::Fetch { source: err })?;
            let response = client
                .get(url.clone())
                .send()
                .await
                .map_err(|err| SourceError::Fetch { source: err })?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Status {
                    status: status.as_u16(),
                });
            }
            response
                .bytes()
                .await
                .map_err(|err| SourceError::Fetch { source: err })
        }
    }
}
