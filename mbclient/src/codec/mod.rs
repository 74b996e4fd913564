pub(crate) mod decoder;

mod ascii;
mod mbap;
mod rtu;

pub use ascii::AsciiCodec;
pub use mbap::MbapCodec;
pub use rtu::RtuCodec;

use crate::common::frame::{Adu, Pdu};
use crate::error::RequestError;

/// Capability set implemented by each framing variant.
///
/// `encode` takes `&mut self` because the MBAP codec advances its transaction
/// id counter with every frame it produces.
pub trait ProtocolCodec: Send {
    /// wrap a request PDU in the variant's on-wire envelope
    fn encode(&mut self, pdu: &Pdu) -> Result<Adu, RequestError>;

    /// validate a complete response buffer and unpack it
    fn decode(&self, response: &[u8]) -> Result<Adu, RequestError>;
}
