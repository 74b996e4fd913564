//! Client engine: ties the request encoder, a framing codec and a transport
//! into one request/response transaction.

pub mod url;

pub use url::{Scheme, Url};

use crate::codec::{MbapCodec, ProtocolCodec, RtuCodec};
use crate::common::frame::Adu;
use crate::decode::DecodeLevel;
use crate::error::{RequestError, UrlError};
use crate::transport::{TcpTransport, Transport};
use crate::types::{Request, UnitId};

/// One-request-in-flight Modbus client
pub struct Client {
    codec: Box<dyn ProtocolCodec>,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Build the codec/transport pairing the URL's scheme selects.
    ///
    /// Only `TCPP` and `ROTP` have a pairing; the serial client types are
    /// recognized but rejected.
    pub fn new(url: &Url, decode: DecodeLevel) -> Result<Self, RequestError> {
        let unit_id = UnitId::new(url.slave_id);
        let codec: Box<dyn ProtocolCodec> = match url.scheme {
            Scheme::Tcp => Box::new(MbapCodec::new(unit_id, decode.frame)),
            Scheme::RtuOverTcp => Box::new(RtuCodec::new(unit_id, decode.frame)),
            Scheme::AsciiOverTcp | Scheme::Rtu | Scheme::Ascii => {
                return Err(UrlError::UnsupportedScheme(url.scheme).into())
            }
        };
        let transport = Box::new(TcpTransport::new(
            &url.host,
            url.port,
            url.timeout,
            decode.physical,
        ));
        Ok(Client { codec, transport })
    }

    /// Assemble a client from explicit parts, e.g. an
    /// [`AsciiCodec`](crate::codec::AsciiCodec) or a test transport.
    pub fn from_parts(codec: Box<dyn ProtocolCodec>, transport: Box<dyn Transport>) -> Self {
        Client { codec, transport }
    }

    /// Execute one read transaction against the device the URL names.
    ///
    /// A response timeout is not an error: it yields an ADU with the
    /// `timeout` flag set and the sentinel function code, so the caller can
    /// distinguish a silent device from a broken exchange.
    pub async fn request(&mut self, url: &Url) -> Result<Adu, RequestError> {
        let request = Request::from_absolute(url.address, url.quantity)?;
        let adu = self.codec.encode(&request.encode())?;

        self.transport.connect().await?;
        let result = self.transact(&adu).await;
        // the connection is released on every exit path, errors included
        self.transport.close().await;
        result
    }

    async fn transact(&mut self, request: &Adu) -> Result<Adu, RequestError> {
        if let Err(err) = self.transport.send(&request.bytes()).await {
            self.flush().await;
            return Err(err);
        }

        match self.transport.listen().await {
            Ok(()) => {}
            Err(RequestError::ResponseTimeout) => return Ok(Adu::timeout_sentinel()),
            Err(err) => {
                self.flush().await;
                return Err(err);
            }
        }

        // decode and flush under one lock: the response is observed as a
        // consistent snapshot and consumed exactly once
        let mut buffer = self.transport.buffer().lock().await;
        let decoded = self.codec.decode(&buffer);
        buffer.clear();
        drop(buffer);
        decoded
    }

    async fn flush(&self) {
        self.transport.buffer().lock().await.clear();
    }
}
