use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::constants::limits;
use crate::decode::{format_bytes, PhysDecodeLevel};
use crate::error::RequestError;

/// Byte-oriented link the client engine drives.
///
/// `listen` appends received bytes to a mutex-guarded response buffer rather
/// than returning them; the engine decodes and flushes under a single lock so
/// a response is consumed at most once, even if requests ever run
/// concurrently on the same transport.
#[async_trait]
pub trait Transport: Send {
    /// Return only once a usable connection exists. May retry internally.
    async fn connect(&mut self) -> Result<(), RequestError>;

    /// Write the whole frame, bounded by the configured deadline.
    async fn send(&mut self, frame: &[u8]) -> Result<(), RequestError>;

    /// Block until at least one read completes or the deadline expires.
    async fn listen(&mut self) -> Result<(), RequestError>;

    /// The response buffer. Hold the lock across decode + flush.
    fn buffer(&self) -> &Mutex<Vec<u8>>;

    /// Tear the connection down. Idempotent.
    async fn close(&mut self);
}

/// TCP transport with a deadline on every socket operation
pub struct TcpTransport {
    addr: String,
    timeout: Duration,
    stream: Option<TcpStream>,
    buffer: Mutex<Vec<u8>>,
    decode: PhysDecodeLevel,
}

impl TcpTransport {
    pub fn new(host: &str, port: u16, timeout: Duration, decode: PhysDecodeLevel) -> Self {
        TcpTransport {
            addr: format!("{host}:{port}"),
            timeout,
            stream: None,
            buffer: Mutex::new(Vec::new()),
            decode,
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<(), RequestError> {
        let mut last = ErrorKind::TimedOut;
        for _ in 0..limits::CONNECT_RETRIES {
            match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
                Ok(Ok(stream)) => {
                    self.stream = Some(stream);
                    return Ok(());
                }
                Ok(Err(err)) => last = err.kind(),
                Err(_elapsed) => last = ErrorKind::TimedOut,
            }
        }
        Err(RequestError::ConnectFailed(last))
    }

    async fn send(&mut self, frame: &[u8]) -> Result<(), RequestError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(RequestError::SendFailed(ErrorKind::NotConnected))?;
        if self.decode.enabled() {
            tracing::info!("PHYS TX - {}", PhysDisplay::new(self.decode, frame));
        }
        match tokio::time::timeout(self.timeout, stream.write_all(frame)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(RequestError::SendFailed(err.kind())),
            Err(_elapsed) => Err(RequestError::SendFailed(ErrorKind::TimedOut)),
        }
    }

    async fn listen(&mut self) -> Result<(), RequestError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(RequestError::ReceiveFailed(ErrorKind::NotConnected))?;
        let mut chunk = [0u8; limits::MAX_READ_SIZE];
        match tokio::time::timeout(self.timeout, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => Err(RequestError::ReceiveFailed(ErrorKind::UnexpectedEof)),
            Ok(Ok(count)) => {
                if self.decode.enabled() {
                    tracing::info!(
                        "PHYS RX - {}",
                        PhysDisplay::new(self.decode, &chunk[..count])
                    );
                }
                self.buffer.lock().await.extend_from_slice(&chunk[..count]);
                Ok(())
            }
            Ok(Err(err)) => Err(RequestError::ReceiveFailed(err.kind())),
            Err(_elapsed) => Err(RequestError::ResponseTimeout),
        }
    }

    fn buffer(&self) -> &Mutex<Vec<u8>> {
        &self.buffer
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}

pub(crate) struct PhysDisplay<'a> {
    level: PhysDecodeLevel,
    data: &'a [u8],
}

impl<'a> PhysDisplay<'a> {
    pub(crate) fn new(level: PhysDecodeLevel, data: &'a [u8]) -> Self {
        PhysDisplay { level, data }
    }
}

impl std::fmt::Display for PhysDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} bytes", self.data.len())?;
        if self.level.data_enabled() {
            format_bytes(f, self.data)?;
        }
        Ok(())
    }
}
