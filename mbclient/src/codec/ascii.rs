use crate::codec::decoder::{self, Variant};
use crate::codec::ProtocolCodec;
use crate::common::frame::{Adu, Pdu};
use crate::constants::{ascii, len, min_frame};
use crate::decode::FrameDecodeLevel;
use crate::error::{FrameParseError, RequestError};
use crate::types::UnitId;

/// ASCII codec: `:` delimited, hex encoded, `CR LF` terminated, LRC trailer
///
/// The LRC is computed over the binary form before hex encoding; the two
/// delimiters go on the wire raw.
pub struct AsciiCodec {
    unit_id: UnitId,
    decode: FrameDecodeLevel,
}

impl AsciiCodec {
    pub fn new(unit_id: UnitId, decode: FrameDecodeLevel) -> Self {
        AsciiCodec { unit_id, decode }
    }
}

impl ProtocolCodec for AsciiCodec {
    fn encode(&mut self, pdu: &Pdu) -> Result<Adu, RequestError> {
        // binary form first: slave id header, then the checksum over
        // header + function + data
        let mut adu = Adu::new(Some(pdu.clone()));
        adu.slave_id = self.unit_id.value;
        adu.header = vec![self.unit_id.value];
        adu.error_lrc();

        // hex-expand every section; the delimiters stay raw
        adu.header = to_hex(&adu.header);
        adu.function = to_hex(&adu.function);
        adu.data = to_hex(&adu.data);
        adu.err = to_hex(&adu.err);
        adu.sof = vec![ascii::COLON];
        adu.eof = vec![ascii::CR, ascii::LF];

        if self.decode.enabled() {
            tracing::info!("ASCII TX - {}", AsciiDisplay::new(self.decode, &adu));
        }
        Ok(adu)
    }

    fn decode(&self, response: &[u8]) -> Result<Adu, RequestError> {
        if response.len() < min_frame::ASCII {
            return Err(FrameParseError::ShortFrame(response.len(), min_frame::ASCII).into());
        }

        // hex-decode the body, keep the delimiters, and run the state machine
        // over the reconstructed binary frame
        let body = from_hex(&response[len::SOF..response.len() - len::EOF])?;
        let mut binary = Vec::with_capacity(len::SOF + body.len() + len::EOF);
        binary.push(response[0]);
        binary.extend_from_slice(&body);
        binary.extend_from_slice(&response[response.len() - len::EOF..]);

        let adu = decoder::recover(Variant::Ascii, &binary)?;
        if self.decode.enabled() {
            tracing::info!("ASCII RX - {}", AsciiDisplay::new(self.decode, &adu));
        }
        Ok(adu)
    }
}

/// uppercase hex representation, two output bytes per input byte
fn to_hex(bin: &[u8]) -> Vec<u8> {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut text = Vec::with_capacity(bin.len() * 2);
    for byte in bin {
        text.push(DIGITS[(byte >> 4) as usize]);
        text.push(DIGITS[(byte & 0x0F) as usize]);
    }
    text
}

fn hex_value(c: u8) -> Result<u8, RequestError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        _ => Err(FrameParseError::FrameAlignment.into()),
    }
}

/// inverse of [`to_hex`]; an odd length or a non-hex character means the
/// frame is not aligned to hex pairs
fn from_hex(text: &[u8]) -> Result<Vec<u8>, RequestError> {
    if text.len() % 2 != 0 {
        return Err(FrameParseError::FrameAlignment.into());
    }
    let mut bin = Vec::with_capacity(text.len() / 2);
    for pair in text.chunks_exact(2) {
        bin.push(hex_value(pair[0])? << 4 | hex_value(pair[1])?);
    }
    Ok(bin)
}

struct AsciiDisplay<'a> {
    level: FrameDecodeLevel,
    adu: &'a Adu,
}

impl<'a> AsciiDisplay<'a> {
    fn new(level: FrameDecodeLevel, adu: &'a Adu) -> Self {
        AsciiDisplay { level, adu }
    }
}

impl std::fmt::Display for AsciiDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "slave: {:#04X}", self.adu.slave_id)?;
        if self.level.payload_enabled() {
            crate::decode::format_bytes(f, &self.adu.data)?;
        }
        Ok(())
    }
}
