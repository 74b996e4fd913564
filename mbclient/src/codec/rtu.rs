use crate::codec::decoder::{self, Variant};
use crate::codec::ProtocolCodec;
use crate::common::frame::{Adu, Pdu};
use crate::decode::FrameDecodeLevel;
use crate::error::RequestError;
use crate::types::UnitId;

/// RTU-over-TCP codec: slave id header plus a trailing CRC-16
///
/// The CRC is placed high byte first, matching the device fleet this client
/// talks to rather than the little-endian order in the Modbus serial spec.
pub struct RtuCodec {
    unit_id: UnitId,
    decode: FrameDecodeLevel,
}

impl RtuCodec {
    pub fn new(unit_id: UnitId, decode: FrameDecodeLevel) -> Self {
        RtuCodec { unit_id, decode }
    }
}

impl ProtocolCodec for RtuCodec {
    fn encode(&mut self, pdu: &Pdu) -> Result<Adu, RequestError> {
        let mut adu = Adu::new(Some(pdu.clone()));
        adu.slave_id = self.unit_id.value;
        adu.header = vec![self.unit_id.value];
        adu.error_crc();

        if self.decode.enabled() {
            tracing::info!("RTU TX - {}", RtuDisplay::new(self.decode, &adu));
        }
        Ok(adu)
    }

    fn decode(&self, response: &[u8]) -> Result<Adu, RequestError> {
        let adu = decoder::recover(Variant::Rtu, response)?;
        if self.decode.enabled() {
            tracing::info!("RTU RX - {}", RtuDisplay::new(self.decode, &adu));
        }
        Ok(adu)
    }
}

struct RtuDisplay<'a> {
    level: FrameDecodeLevel,
    adu: &'a Adu,
}

impl<'a> RtuDisplay<'a> {
    fn new(level: FrameDecodeLevel, adu: &'a Adu) -> Self {
        RtuDisplay { level, adu }
    }
}

impl std::fmt::Display for RtuDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "slave: {:#04X} crc: {:#06X}",
            self.adu.slave_id, self.adu.crc
        )?;
        if self.level.payload_enabled() {
            crate::decode::format_bytes(f, &self.adu.data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::checksum::crc16;
    use crate::error::FrameParseError;
    use crate::types::Request;
    use crate::FunctionCode;

    fn codec() -> RtuCodec {
        RtuCodec::new(UnitId::new(0x11), FrameDecodeLevel::Nothing)
    }

    #[test]
    fn encodes_a_read_coils_request_with_big_endian_crc() {
        let pdu = Request::new(FunctionCode::ReadCoils, 0x0013, 0x000D).encode();
        let adu = codec().encode(&pdu).unwrap();
        assert_eq!(
            adu.bytes(),
            vec![0x11, 0x01, 0x00, 0x13, 0x00, 0x0D, 0x9A, 0x0E]
        );
        assert_eq!(adu.crc, 0x9A0E);
    }

    #[test]
    fn crc_recomputed_over_the_body_matches_the_trailer() {
        let pdu = Request::new(FunctionCode::ReadHoldingRegisters, 0x006B, 0x0003).encode();
        let adu = codec().encode(&pdu).unwrap();
        let bytes = adu.bytes();
        let body_len = bytes.len() - 2;
        assert_eq!(
            crc16(&bytes[..body_len]),
            u16::from_be_bytes([bytes[body_len], bytes[body_len + 1]])
        );
    }

    #[test]
    fn decodes_a_read_coils_response() {
        let mut frame = vec![0x11, 0x01, 0x02, 0xCD, 0x6B];
        frame.extend_from_slice(&crc16(&frame).to_be_bytes());
        let adu = codec().decode(&frame).unwrap();
        assert_eq!(adu.slave_id, 0x11);
        assert_eq!(adu.function_code(), 0x01);
        assert_eq!(adu.data, vec![0x02, 0xCD, 0x6B]);
        assert_eq!(adu.byte_count(), Some(2));
        assert_eq!(adu.payload(), &[0xCD, 0x6B]);
    }

    #[test]
    fn rejects_a_corrupted_crc() {
        let mut frame = vec![0x11, 0x01, 0x02, 0xCD, 0x6B];
        frame.extend_from_slice(&crc16(&frame).to_be_bytes());
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        match codec().decode(&frame) {
            Err(RequestError::BadFrame(FrameParseError::ChecksumMismatch(_, computed))) => {
                assert_eq!(computed, 0x406D);
            }
            other => panic!("expected a checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn decodes_an_exception_response() {
        let mut frame = vec![0x11, 0x83, 0x02];
        frame.extend_from_slice(&crc16(&frame).to_be_bytes());
        assert_eq!(frame[3..5], [0x34, 0xC1]);
        let adu = codec().decode(&frame).unwrap();
        assert_eq!(adu.function_code(), 0x83);
        assert_eq!(adu.exception_text(), Some("Illegal data address"));
    }

    #[test]
    fn round_trips_a_response_shaped_pdu() {
        // byte-count framed data, as a device would produce it
        let pdu = Pdu {
            function: 0x02,
            data: vec![0x03, 0xAC, 0xDB, 0x35],
        };
        let mut codec = codec();
        let encoded = codec.encode(&pdu).unwrap();
        let decoded = codec.decode(&encoded.bytes()).unwrap().pdu();
        assert_eq!(decoded, pdu);
    }
}
