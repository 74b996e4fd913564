//! Section-driven decode state machine shared by all three framing variants.
//!
//! The variant picks the starting section: MBAP parses its header linearly,
//! RTU verifies the CRC before anything else, ASCII validates the frame
//! delimiters first and then the LRC. Sections are a sum type and every
//! handler returns the next section, so there is no shared mutable progress
//! state to forget to update.

use crate::common::checksum;
use crate::common::cursor::ReadCursor;
use crate::common::frame::Adu;
use crate::common::function::FunctionCode;
use crate::constants::{ascii, len, mbap, min_frame};
use crate::error::{AduParseError, FrameParseError, RequestError};
use crate::exception::ExceptionCode;

/// framing variant being decoded
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Variant {
    Mbap,
    Rtu,
    /// binary form of an ASCII frame, delimiters retained
    Ascii,
}

/// decode progress, one section per frame region
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Section {
    /// `:` start delimiter
    AsciiSof,
    /// `CR LF` end delimiter
    AsciiEof,
    /// checksum verification, dispatched by variant
    ErrCheck,
    /// the 7-byte MBAP header
    Mbap,
    /// single slave id byte of an RTU frame
    Rtu,
    /// single slave id byte of an ASCII frame
    Ascii,
    /// function code, exception or byte-count framed data
    Pdu,
    /// every check passed
    Done,
}

/// Run the state machine over a complete response buffer.
///
/// Each transition either consumes bytes through the cursor or moves to a
/// strictly later section, so the machine terminates on every input.
pub(crate) fn recover(variant: Variant, response: &[u8]) -> Result<Adu, RequestError> {
    let min = match variant {
        Variant::Mbap => min_frame::MBAP,
        Variant::Rtu => min_frame::RTU,
        Variant::Ascii => min_frame::ASCII_BINARY,
    };
    if response.len() < min {
        return Err(FrameParseError::ShortFrame(response.len(), min).into());
    }

    let mut adu = Adu::new(None);
    let mut cursor = ReadCursor::new(response);
    let mut section = match variant {
        Variant::Mbap => Section::Mbap,
        // a CRC mismatch rejects the frame before any element is parsed
        Variant::Rtu => Section::ErrCheck,
        // frame alignment first, then the checksum, then the body
        Variant::Ascii => Section::AsciiSof,
    };

    loop {
        section = match section {
            Section::AsciiSof => handle_sof(&mut adu, &mut cursor)?,
            Section::AsciiEof => handle_eof(&mut adu, response)?,
            Section::ErrCheck => handle_err(variant, &mut adu, response)?,
            Section::Mbap => handle_mbap(&mut adu, &mut cursor, response)?,
            Section::Rtu | Section::Ascii => handle_slave_id(&mut adu, &mut cursor)?,
            Section::Pdu => handle_pdu(variant, &mut adu, &mut cursor)?,
            Section::Done => return Ok(adu),
        };
    }
}

fn handle_sof(adu: &mut Adu, cursor: &mut ReadCursor) -> Result<Section, RequestError> {
    let sof = cursor.read_u8()?;
    adu.sof = vec![sof];
    if sof != ascii::COLON {
        return Err(FrameParseError::FrameAlignment.into());
    }
    Ok(Section::AsciiEof)
}

fn handle_eof(adu: &mut Adu, response: &[u8]) -> Result<Section, RequestError> {
    // the delimiter closes the frame; the cursor never reaches it
    let eof = &response[response.len() - len::EOF..];
    adu.eof = eof.to_vec();
    if eof != [ascii::CR, ascii::LF] {
        return Err(FrameParseError::FrameAlignment.into());
    }
    Ok(Section::ErrCheck)
}

fn handle_err(variant: Variant, adu: &mut Adu, response: &[u8]) -> Result<Section, RequestError> {
    match variant {
        // MBAP has no application checksum
        Variant::Mbap => Ok(Section::Done),
        Variant::Rtu => {
            let crc_at = response.len() - len::CRC;
            let received = u16::from_be_bytes([response[crc_at], response[crc_at + 1]]);
            let computed = checksum::crc16(&response[..crc_at]);
            adu.crc = received;
            adu.err = response[crc_at..].to_vec();
            if received != computed {
                return Err(FrameParseError::ChecksumMismatch(received, computed).into());
            }
            Ok(Section::Rtu)
        }
        Variant::Ascii => {
            // slave id through LRC inclusive must sum to zero mod 256
            let body = &response[len::SOF..response.len() - len::EOF];
            let received = body[body.len() - len::LRC];
            adu.err = vec![received];
            if !checksum::lrc_sums_to_zero(body) {
                let computed = checksum::lrc8(&body[..body.len() - len::LRC]);
                return Err(
                    FrameParseError::ChecksumMismatch(received as u16, computed as u16).into(),
                );
            }
            Ok(Section::Ascii)
        }
    }
}

fn handle_mbap(
    adu: &mut Adu,
    cursor: &mut ReadCursor,
    response: &[u8],
) -> Result<Section, RequestError> {
    adu.transaction_id = cursor.read_u16_be()?;
    adu.protocol_id = cursor.read_u16_be()?;
    adu.length = cursor.read_u16_be()?;
    adu.slave_id = cursor.read_u8()?;
    adu.header = response[..len::MBAP_HEADER].to_vec();

    if adu.protocol_id != mbap::PROTOCOL_ID {
        return Err(FrameParseError::UnknownProtocolId(adu.protocol_id).into());
    }
    // the length field counts the slave id, so it covers at least the
    // function code as well
    let declared = adu.length as usize;
    let actual = response.len() - (len::MBAP_HEADER - len::SLAVE_ID);
    if declared < len::SLAVE_ID + len::FUNCTION_CODE || declared != actual {
        return Err(FrameParseError::LengthMismatch(declared, actual).into());
    }
    Ok(Section::Pdu)
}

fn handle_slave_id(adu: &mut Adu, cursor: &mut ReadCursor) -> Result<Section, RequestError> {
    let slave_id = cursor.read_u8()?;
    adu.slave_id = slave_id;
    adu.header = vec![slave_id];
    Ok(Section::Pdu)
}

fn handle_pdu(
    variant: Variant,
    adu: &mut Adu,
    cursor: &mut ReadCursor,
) -> Result<Section, RequestError> {
    let function = cursor.read_u8()?;
    adu.function = vec![function];

    if function & 0x80 != 0 {
        let code = cursor.read_u8()?;
        adu.data = vec![code];
        adu.exception =
            Some(ExceptionCode::get(code).ok_or(AduParseError::UnsupportedException(code))?);
        cursor.expect_remaining(trailer_len(variant))?;
        return Ok(Section::Done);
    }

    if !FunctionCode::is_read(function) {
        return Err(AduParseError::UnsupportedFunction(function).into());
    }

    match variant {
        Variant::Mbap => {
            // everything the length field declares beyond slave id and
            // function code
            let data_len = adu.length as usize - len::SLAVE_ID - len::FUNCTION_CODE;
            adu.data = cursor.read_bytes(data_len)?.to_vec();
        }
        Variant::Rtu | Variant::Ascii => {
            let byte_count = cursor.read_u8()?;
            if byte_count == 0 {
                return Err(AduParseError::ZeroByteCount.into());
            }
            let mut data = Vec::with_capacity(1 + byte_count as usize);
            data.push(byte_count);
            data.extend_from_slice(cursor.read_bytes(byte_count as usize)?);
            adu.data = data;
        }
    }
    cursor.expect_remaining(trailer_len(variant))?;
    Ok(Section::Done)
}

/// bytes that legitimately follow the PDU
fn trailer_len(variant: Variant) -> usize {
    match variant {
        Variant::Mbap => 0,
        Variant::Rtu => len::CRC,
        Variant::Ascii => len::LRC + len::EOF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_buffers_are_rejected_per_variant() {
        assert_eq!(
            recover(Variant::Mbap, &[0x00; 7]),
            Err(FrameParseError::ShortFrame(7, 8).into())
        );
        assert_eq!(
            recover(Variant::Rtu, &[0x00; 3]),
            Err(FrameParseError::ShortFrame(3, 4).into())
        );
        assert_eq!(
            recover(Variant::Ascii, &[0x00; 5]),
            Err(FrameParseError::ShortFrame(5, 6).into())
        );
    }

    #[test]
    fn mbap_rejects_a_foreign_protocol_id() {
        let frame = [0x00, 0x07, 0xCA, 0xFE, 0x00, 0x03, 0x01, 0x83, 0x02];
        assert_eq!(
            recover(Variant::Mbap, &frame),
            Err(FrameParseError::UnknownProtocolId(0xCAFE).into())
        );
    }

    #[test]
    fn mbap_rejects_a_length_field_disagreeing_with_the_buffer() {
        // length says 9, buffer carries 7 past the length field
        let frame = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x09, 0x01, 0x03, 0x04, 0x00, 0x0A, 0x00, 0x14,
        ];
        assert_eq!(
            recover(Variant::Mbap, &frame),
            Err(FrameParseError::LengthMismatch(9, 7).into())
        );
    }

    #[test]
    fn unknown_function_codes_are_rejected() {
        // function code 0x07 is not on the read path
        let frame = [0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x07];
        assert_eq!(
            recover(Variant::Mbap, &frame),
            Err(AduParseError::UnsupportedFunction(0x07).into())
        );
    }

    #[test]
    fn unknown_exception_codes_are_rejected() {
        let frame = [0x00, 0x05, 0x00, 0x00, 0x00, 0x03, 0x01, 0x83, 0x07];
        assert_eq!(
            recover(Variant::Mbap, &frame),
            Err(AduParseError::UnsupportedException(0x07).into())
        );
    }

    #[test]
    fn every_defined_exception_code_decodes() {
        for code in [1u8, 2, 3, 4, 5, 6, 8, 10, 11] {
            for function in [0x81u8, 0x82, 0x83, 0x84] {
                let frame = [0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x01, function, code];
                let adu = recover(Variant::Mbap, &frame).unwrap();
                assert_eq!(adu.function_code(), function);
                assert_eq!(adu.exception_code(), Some(code));
            }
        }
    }

    #[test]
    fn minimum_mbap_length_field_decodes_with_empty_data() {
        // length of 2 covers only the slave id and the function code
        let frame = [0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x03];
        let adu = recover(Variant::Mbap, &frame).unwrap();
        assert_eq!(adu.function_code(), 0x03);
        assert!(adu.data.is_empty());
    }

    #[test]
    fn rtu_read_uses_the_byte_count_for_framing() {
        let mut frame = vec![0x11, 0x01, 0x02, 0xCD, 0x6B];
        frame.extend_from_slice(&checksum::crc16(&frame).to_be_bytes());
        let adu = recover(Variant::Rtu, &frame).unwrap();
        assert_eq!(adu.slave_id, 0x11);
        assert_eq!(adu.function_code(), 0x01);
        assert_eq!(adu.data, vec![0x02, 0xCD, 0x6B]);
        assert_eq!(adu.crc, 0x406D);
    }

    #[test]
    fn rtu_rejects_a_zero_byte_count() {
        let mut frame = vec![0x11, 0x01, 0x00];
        frame.extend_from_slice(&checksum::crc16(&frame).to_be_bytes());
        assert_eq!(
            recover(Variant::Rtu, &frame),
            Err(AduParseError::ZeroByteCount.into())
        );
    }

    #[test]
    fn minimum_size_rtu_frame_passes_the_crc_but_starves_the_pdu() {
        let mut frame = vec![0x11, 0x01];
        frame.extend_from_slice(&checksum::crc16(&frame).to_be_bytes());
        assert_eq!(frame.len(), 4);
        assert_eq!(
            recover(Variant::Rtu, &frame),
            Err(AduParseError::InsufficientBytes.into())
        );
    }
}
