use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_native_tls::TlsStream;

/// Write/read timestamps of the exchange currently on a connection.
#[derive(Debug, Default)]
pub(crate) struct IoMarks {
    inner: Mutex<IoState>,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct IoState {
    /// Last successful write before any response byte arrived.
    pub(crate) request_written: Option<Instant>,
    /// First read that yielded bytes.
    pub(crate) first_byte: Option<Instant>,
}

impl IoMarks {
    /// Forgets the previous exchange so a reused connection starts clean.
    pub(crate) fn reset(&self) {
        *self.lock() = IoState::default();
    }

    pub(crate) fn snapshot(&self) -> IoState {
        *self.lock()
    }

    fn record_write(&self) {
        let mut state = self.lock();
        if state.first_byte.is_none() {
            state.request_written = Some(Instant::now());
        }
    }

    fn record_read(&self) {
        let mut state = self.lock();
        if state.first_byte.is_none() {
            state.first_byte = Some(Instant::now());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IoState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Plain or TLS socket under the timing wrapper.
pub(crate) enum Transport {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Stamps [`IoMarks`] as bytes cross the socket.
pub(crate) struct TimedIo<S> {
    inner: S,
    marks: Arc<IoMarks>,
}

impl<S> TimedIo<S> {
    pub(crate) const fn new(inner: S, marks: Arc<IoMarks>) -> Self {
        Self { inner, marks }
    }
}

impl<S> AsyncRead for TimedIo<S>
where
    S: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if matches!(poll, Poll::Ready(Ok(()))) && buf.filled().len() > before {
            this.marks.record_read();
        }
        poll
    }
}

impl<S> AsyncWrite for TimedIo<S>
where
    S: AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = poll
            && written > 0
        {
            this.marks.record_write();
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
