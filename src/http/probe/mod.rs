//! Single instrumented HTTP/1.1 exchanges.
mod clock;
mod io;
mod pool;

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_TYPE, HOST, USER_AGENT};
use http::{HeaderValue, Request};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tokio_native_tls::{TlsConnector, native_tls};
use tracing::debug;
use url::Url;

use crate::args::{DEFAULT_USER_AGENT, HttpMethod};
use crate::config::{RequestHeader, RunConfig};
use crate::error::{AppError, AppResult, HttpError, ProbeError};
use crate::metrics::{FailureKind, Sample, SampleOutcome};

use clock::PhaseMarks;
use io::{IoMarks, TimedIo, Transport};
use pool::{ConnectionPool, Origin, PooledConnection, Scheme};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Issues one request per [`Prober::probe`] call and times every phase of it.
///
/// Cloning is cheap; clones share the keep-alive pool.
#[derive(Clone)]
pub struct Prober {
    method: HttpMethod,
    body: Option<Bytes>,
    header: Option<RequestHeader>,
    timeout: Duration,
    tls: TlsConnector,
    pool: Option<ConnectionPool>,
}

impl Prober {
    /// # Errors
    ///
    /// Returns an error when the TLS connector cannot be initialised.
    pub fn new(config: &RunConfig) -> AppResult<Self> {
        let connector = native_tls::TlsConnector::new()
            .map_err(|err| AppError::http(HttpError::TlsConnector { source: err }))?;
        Ok(Self::with_tls(config, connector))
    }

    /// Builds a prober that verifies servers with `connector`.
    pub(crate) fn with_tls(config: &RunConfig, connector: native_tls::TlsConnector) -> Self {
        Self {
            method: config.method,
            body: config.body.clone(),
            header: config.header.clone(),
            timeout: config.request_timeout,
            tls: TlsConnector::from(connector),
            pool: config.keep_alive.then(ConnectionPool::default),
        }
    }

    /// Runs one exchange against `url`. Never fails: errors become failed samples.
    pub async fn probe(&self, url: &Url) -> Sample {
        let start = Instant::now();
        let deadline = start.checked_add(self.timeout);
        let mut marks = PhaseMarks::new(start);
        let result = self.exchange(url, deadline, &mut marks).await;
        let end = Instant::now();
        let outcome = match result {
            Ok((status, response_bytes)) => SampleOutcome::Completed {
                status,
                response_bytes,
            },
            Err(err) => {
                debug!("Request to {} failed: {}", url, err);
                if err.is_timeout() {
                    SampleOutcome::Failed(FailureKind::Timeout)
                } else {
                    SampleOutcome::Failed(FailureKind::Transport)
                }
            }
        };
        marks.into_sample(end, outcome)
    }

    async fn exchange(
        &self,
        url: &Url,
        deadline: Option<Instant>,
        marks: &mut PhaseMarks,
    ) -> Result<(u16, u64), ProbeError> {
        let origin = Origin::from_url(url)?;
        let mut connection = match self.reusable_connection(&origin, deadline).await {
            Some(connection) => connection,
            None => self.connect(&origin, deadline, marks).await?,
        };
        connection.marks.reset();
        marks.io = Some(Arc::clone(&connection.marks));

        let request = self.build_request(url)?;
        within(deadline, connection.sender.ready())
            .await?
            .map_err(|err| ProbeError::Request { source: err })?;
        let response = within(deadline, connection.sender.send_request(request))
            .await?
            .map_err(|err| ProbeError::Request { source: err })?;
        let status = response.status().as_u16();
        let server_closes = response
            .headers()
            .get(CONNECTION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("close"));

        let mut body = response.into_body();
        let mut response_bytes: u64 = 0;
        while let Some(frame) = within(deadline, body.frame()).await? {
            let frame = frame.map_err(|err| ProbeError::Body { source: err })?;
            if let Some(chunk) = frame.data_ref() {
                let len = u64::try_from(chunk.len()).unwrap_or(u64::MAX);
                response_bytes = response_bytes.saturating_add(len);
            }
        }
        marks.last_byte = Some(Instant::now());

        if let Some(pool) = self.pool.as_ref()
            && !server_closes
        {
            pool.checkin(origin, connection);
        }
        Ok((status, response_bytes))
    }

    /// An idle pooled connection that still accepts requests.
    async fn reusable_connection(
        &self,
        origin: &Origin,
        deadline: Option<Instant>,
    ) -> Option<PooledConnection> {
        let pool = self.pool.as_ref()?;
        while let Some(mut connection) = pool.checkout(origin) {
            if let Ok(Ok(())) = within(deadline, connection.sender.ready()).await {
                return Some(connection);
            }
        }
        None
    }

    async fn connect(
        &self,
        origin: &Origin,
        deadline: Option<Instant>,
        marks: &mut PhaseMarks,
    ) -> Result<PooledConnection, ProbeError> {
        let addr = match origin.host.trim_matches(['[', ']']).parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, origin.port),
            Err(_) => {
                let lookup_start = Instant::now();
                let mut addrs = within(
                    deadline,
                    tokio::net::lookup_host((origin.host.as_str(), origin.port)),
                )
                .await?
                .map_err(|err| ProbeError::Dns {
                    host: origin.host.clone(),
                    source: err,
                })?;
                marks.dns = lookup_start.elapsed();
                addrs.next().ok_or_else(|| ProbeError::NoAddresses {
                    host: origin.host.clone(),
                })?
            }
        };

        let connect_start = Instant::now();
        let stream = within(deadline, TcpStream::connect(addr))
            .await?
            .map_err(|err| ProbeError::Connect { source: err })?;
        if let Err(err) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", err);
        }
        let transport = match origin.scheme {
            Scheme::Http => Transport::Plain(stream),
            Scheme::Https => {
                let tls_stream = within(deadline, self.tls.connect(&origin.host, stream))
                    .await?
                    .map_err(|err| ProbeError::Tls { source: err })?;
                Transport::Tls(Box::new(tls_stream))
            }
        };

        let io_marks = Arc::new(IoMarks::default());
        let io = TokioIo::new(TimedIo::new(transport, Arc::clone(&io_marks)));
        let (sender, connection) = within(deadline, http1::handshake(io))
            .await?
            .map_err(|err| ProbeError::Handshake { source: err })?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                debug!("Connection closed with error: {}", err);
            }
        });
        marks.tcp_connect = connect_start.elapsed();

        Ok(PooledConnection {
            sender,
            marks: io_marks,
        })
    }

    fn build_request(&self, url: &Url) -> Result<Request<Full<Bytes>>, ProbeError> {
        let mut target = url.path().to_owned();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_owned(),
            (None, _) => return Err(ProbeError::MissingHost),
        };

        let mut builder = Request::builder()
            .method(self.method.as_method())
            .uri(target)
            .header(HOST, host)
            .header(USER_AGENT, DEFAULT_USER_AGENT);
        if self.body.is_some() {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        if self.pool.is_none() {
            builder = builder.header(CONNECTION, HeaderValue::from_static("close"));
        }
        let body = self.body.clone().unwrap_or_default();
        let mut request = builder
            .body(Full::new(body))
            .map_err(|err| ProbeError::BuildRequest { source: err })?;
        if let Some(header) = self.header.as_ref() {
            request
                .headers_mut()
                .insert(header.name.clone(), header.value.clone());
        }
        Ok(request)
    }

    #[cfg(test)]
    pub(crate) fn idle_connections(&self) -> usize {
        self.pool.as_ref().map_or(0, ConnectionPool::idle_count)
    }
}

/// Awaits `future`, giving up at `deadline` when there is one.
async fn within<F>(deadline: Option<Instant>, future: F) -> Result<F::Output, ProbeError>
where
    F: Future,
{
    match deadline {
        Some(deadline) => timeout_at(deadline, future)
            .await
            .map_err(|_elapsed| ProbeError::Timeout),
        None => Ok(future.await),
    }
}
