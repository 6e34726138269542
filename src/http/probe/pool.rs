use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use http_body_util::Full;
use hyper::client::conn::http1::SendRequest;
use url::Url;

use crate::error::ProbeError;

use super::io::IoMarks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Scheme {
    Http,
    Https,
}

/// Connections are only shared between requests with the same origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Origin {
    pub(crate) scheme: Scheme,
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl Origin {
    pub(crate) fn from_url(url: &Url) -> Result<Self, ProbeError> {
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(ProbeError::UnsupportedScheme {
                    scheme: other.to_owned(),
                });
            }
        };
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(ProbeError::MissingHost)?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| ProbeError::UnsupportedScheme {
                scheme: url.scheme().to_owned(),
            })?;
        Ok(Self {
            scheme,
            host: host.to_owned(),
            port,
        })
    }
}

/// An HTTP/1.1 connection plus the marks its socket writes into.
pub(crate) struct PooledConnection {
    pub(crate) sender: SendRequest<Full<Bytes>>,
    pub(crate) marks: Arc<IoMarks>,
}

/// Idle keep-alive connections shared by every worker of a run.
#[derive(Clone, Default)]
pub(crate) struct ConnectionPool {
    idle: Arc<Mutex<HashMap<Origin, Vec<PooledConnection>>>>,
}

impl ConnectionPool {
    /// Takes an idle connection that is still open, dropping dead ones on the way.
    pub(crate) fn checkout(&self, origin: &Origin) -> Option<PooledConnection> {
        let mut idle = self.lock();
        let connections = idle.get_mut(origin)?;
        while let Some(connection) = connections.pop() {
            if !connection.sender.is_closed() {
                return Some(connection);
            }
        }
        None
    }

    /// Returns a connection whose last response was read to the end.
    pub(crate) fn checkin(&self, origin: Origin, connection: PooledConnection) {
        if connection.sender.is_closed() {
            return;
        }
        self.lock().entry(origin).or_default().push(connection);
    }

    #[cfg(test)]
    pub(crate) fn idle_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Origin, Vec<PooledConnection>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
