use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_native_tls::{TlsAcceptor, native_tls};

/// Root that signed [`TEST_SERVER_CERT`]; trust it to reach [`spawn_tls_server`].
pub(crate) const TEST_CA_CERT: &[u8] = include_bytes!("testdata/ca.pem");
/// Leaf for `127.0.0.1` and `localhost`.
const TEST_SERVER_CERT: &[u8] = include_bytes!("testdata/server.pem");
const TEST_SERVER_KEY: &[u8] = include_bytes!("testdata/server.key");

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: String,
    pub(crate) target: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl RecordedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerBehavior {
    pub(crate) status: u16,
    pub(crate) body: &'static str,
    pub(crate) delay: Duration,
}

impl Default for ServerBehavior {
    fn default() -> Self {
        Self {
            status: 200,
            body: "OK",
            delay: Duration::ZERO,
        }
    }
}

/// Minimal keep-alive capable HTTP/1.1 server recording what it receives.
pub(crate) struct TestServer {
    pub(crate) base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connections: Arc<AtomicUsize>,
}

impl TestServer {
    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub(crate) async fn spawn_http_server(behavior: ServerBehavior) -> Result<TestServer, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind test server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read server addr: {}", err))?;
    let requests = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));

    let server_requests = Arc::clone(&requests);
    let server_connections = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            server_connections.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(serve_connection(
                socket,
                behavior.clone(),
                Arc::clone(&server_requests),
            ));
        }
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        requests,
        connections,
    })
}

/// Same as [`spawn_http_server`] behind TLS; `base_url` is `https://127.0.0.1:port`.
pub(crate) async fn spawn_tls_server(behavior: ServerBehavior) -> Result<TestServer, String> {
    let identity = native_tls::Identity::from_pkcs8(TEST_SERVER_CERT, TEST_SERVER_KEY)
        .map_err(|err| format!("Invalid test identity: {}", err))?;
    let acceptor = native_tls::TlsAcceptor::new(identity)
        .map(TlsAcceptor::from)
        .map_err(|err| format!("Failed to build TLS acceptor: {}", err))?;
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind TLS server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read server addr: {}", err))?;
    let requests = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));

    let server_requests = Arc::clone(&requests);
    let server_connections = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            server_connections.fetch_add(1, Ordering::SeqCst);
            let acceptor = acceptor.clone();
            let behavior = behavior.clone();
            let requests = Arc::clone(&server_requests);
            tokio::spawn(async move {
                if let Ok(stream) = acceptor.accept(socket).await {
                    serve_connection(stream, behavior, requests).await;
                }
            });
        }
    });

    Ok(TestServer {
        base_url: format!("https://{}", addr),
        requests,
        connections,
    })
}

/// Accepts connections and never answers.
pub(crate) async fn spawn_silent_server() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind silent server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read server addr: {}", err))?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    Ok(format!("http://{}", addr))
}

/// A loopback URL nothing listens on.
pub(crate) async fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read addr: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

async fn serve_connection<S>(
    mut socket: S,
    behavior: ServerBehavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer: Vec<u8> = Vec::new();
    loop {
        let Some(request) = read_request(&mut socket, &mut buffer).await else {
            return;
        };
        let close = request
            .header("connection")
            .is_some_and(|value| value.eq_ignore_ascii_case("close"));
        requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if !behavior.delay.is_zero() {
            tokio::time::sleep(behavior.delay).await;
        }
        let mut response = format!(
            "HTTP/1.1 {} Test\r\nContent-Length: {}\r\n",
            behavior.status,
            behavior.body.len()
        );
        if close {
            response.push_str("Connection: close\r\n");
        }
        response.push_str("\r\n");
        response.push_str(behavior.body);
        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
        if close {
            let _shutdown_result = socket.shutdown().await;
            return;
        }
    }
}

async fn read_request<S>(socket: &mut S, buffer: &mut Vec<u8>) -> Option<RecordedRequest>
where
    S: AsyncRead + Unpin,
{
    let header_end = loop {
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position;
        }
        let mut chunk = [0u8; 1024];
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(chunk.get(..read)?);
    };

    let head = String::from_utf8_lossy(buffer.get(..header_end)?).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_owned();
    let target = request_line.next()?.to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect();
    let content_length: usize = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0);

    let body_start = header_end.checked_add(4)?;
    let body_end = body_start.checked_add(content_length)?;
    while buffer.len() < body_end {
        let mut chunk = [0u8; 1024];
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(chunk.get(..read)?);
    }
    let body = buffer.get(body_start..body_end)?.to_vec();
    buffer.drain(..body_end);

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}
