use std::fmt::{Display, Formatter};

use crate::client::url::Scheme;

/// Top-level error type returned by the codec and the client engine
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RequestError {
    /// the request URL could not be parsed or names an unsupported client type
    BadUrl(UrlError),
    /// the request parameters are invalid
    BadRequest(InvalidRequest),
    /// the response frame could not be validated
    BadFrame(FrameParseError),
    /// the response PDU could not be parsed
    BadResponse(AduParseError),
    /// unable to establish a connection within the transport's retry budget
    ConnectFailed(std::io::ErrorKind),
    /// unable to write the request to the transport
    SendFailed(std::io::ErrorKind),
    /// unable to read a response for a reason other than a timeout
    ReceiveFailed(std::io::ErrorKind),
    /// no response arrived before the deadline expired
    ///
    /// The engine converts this into a sentinel ADU rather than surfacing it
    /// to the caller.
    ResponseTimeout,
}

/// errors in the request descriptor URL
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UrlError {
    /// the URL does not have the shape
    /// `<scheme>://<host>:<port>/<slave>-<timeout>/<address>-<quantity>`
    Malformed,
    /// the scheme is not one of the known client types
    UnknownScheme,
    /// the scheme names a client type that has no transport/codec pairing
    UnsupportedScheme(Scheme),
    /// a numeric field failed to parse
    BadField(&'static str),
}

/// errors caused by bad request parameters, detected before anything is encoded
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InvalidRequest {
    /// the absolute register number falls outside every mapped range
    AddressOutOfRange(u64),
    /// the function code has no encoding on the read path
    UnsupportedFunction(u8),
    /// the PDU data does not fit the envelope's length field
    PduTooBig(usize),
}

/// errors that occur while validating the framing of a response
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameParseError {
    /// the buffer is shorter than the smallest possible frame for the variant
    ShortFrame(usize, usize), // actual, minimum
    /// a start-of-frame or end-of-frame delimiter is missing or malformed
    FrameAlignment,
    /// the length field disagrees with the bytes actually present
    LengthMismatch(usize, usize), // declared, actual
    /// the received checksum does not match the one computed over the frame
    ChecksumMismatch(u16, u16), // received, computed
    /// the MBAP protocol id field is not the Modbus protocol id
    UnknownProtocolId(u16),
}

/// errors that occur while parsing the PDU of a structurally valid frame
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AduParseError {
    /// the response ended before the field being parsed
    InsufficientBytes,
    /// a read response declared a byte count of zero
    ZeroByteCount,
    /// the response contains bytes after the end of the PDU
    TrailingBytes(usize),
    /// the response function code is not a supported read or exception code
    UnsupportedFunction(u8),
    /// the exception code is not in the known exception table
    UnsupportedException(u8),
}

impl std::error::Error for RequestError {}
impl std::error::Error for UrlError {}
impl std::error::Error for InvalidRequest {}
impl std::error::Error for FrameParseError {}
impl std::error::Error for AduParseError {}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            RequestError::BadUrl(err) => write!(f, "invalid url: {err}"),
            RequestError::BadRequest(err) => err.fmt(f),
            RequestError::BadFrame(err) => err.fmt(f),
            RequestError::BadResponse(err) => err.fmt(f),
            RequestError::ConnectFailed(kind) => write!(f, "unable to connect: {kind:?}"),
            RequestError::SendFailed(kind) => write!(f, "unable to send request: {kind:?}"),
            RequestError::ReceiveFailed(kind) => write!(f, "unable to receive response: {kind:?}"),
            RequestError::ResponseTimeout => {
                f.write_str("timeout occurred before receiving a response")
            }
        }
    }
}

impl Display for UrlError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            UrlError::Malformed => f.write_str(
                "expected <scheme>://<host>:<port>/<slave>-<timeout>/<address>-<quantity>",
            ),
            UrlError::UnknownScheme => f.write_str("unknown scheme"),
            UrlError::UnsupportedScheme(scheme) => {
                write!(f, "client type {scheme} is not supported")
            }
            UrlError::BadField(field) => write!(f, "unable to parse {field}"),
        }
    }
}

impl Display for InvalidRequest {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            InvalidRequest::AddressOutOfRange(absolute) => {
                write!(f, "absolute address {absolute} is not in any mapped range")
            }
            InvalidRequest::UnsupportedFunction(fc) => {
                write!(f, "unsupported function code: {fc:#04X}")
            }
            InvalidRequest::PduTooBig(size) => {
                write!(f, "PDU data of {size} bytes exceeds the envelope's capacity")
            }
        }
    }
}

impl Display for FrameParseError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            FrameParseError::ShortFrame(actual, min) => {
                write!(f, "frame of {actual} bytes is below the minimum of {min}")
            }
            FrameParseError::FrameAlignment => f.write_str("frame delimiters missing or malformed"),
            FrameParseError::LengthMismatch(declared, actual) => write!(
                f,
                "length field declares {declared} bytes but {actual} are present"
            ),
            FrameParseError::ChecksumMismatch(received, computed) => write!(
                f,
                "received checksum {received:#06X} != computed {computed:#06X}"
            ),
            FrameParseError::UnknownProtocolId(id) => {
                write!(f, "frame has non-Modbus protocol id: {id:#06X}")
            }
        }
    }
}

impl Display for AduParseError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            AduParseError::InsufficientBytes => {
                f.write_str("response ended before the field being parsed")
            }
            AduParseError::ZeroByteCount => f.write_str("response declared a byte count of zero"),
            AduParseError::TrailingBytes(count) => {
                write!(f, "response contains {count} extra trailing bytes")
            }
            AduParseError::UnsupportedFunction(fc) => {
                write!(f, "unsupported response function code: {fc:#04X}")
            }
            AduParseError::UnsupportedException(code) => {
                write!(f, "unsupported exception code: {code}")
            }
        }
    }
}

impl From<UrlError> for RequestError {
    fn from(err: UrlError) -> Self {
        RequestError::BadUrl(err)
    }
}

impl From<InvalidRequest> for RequestError {
    fn from(err: InvalidRequest) -> Self {
        RequestError::BadRequest(err)
    }
}

impl From<FrameParseError> for RequestError {
    fn from(err: FrameParseError) -> Self {
        RequestError::BadFrame(err)
    }
}

impl From<AduParseError> for RequestError {
    fn from(err: AduParseError) -> Self {
        RequestError::BadResponse(err)
    }
}
