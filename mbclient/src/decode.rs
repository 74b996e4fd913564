//! Decode levels gate the `tracing` output of the frame codecs and the
//! physical layer. Everything defaults to off.

/// Controls the decoding of transmitted and received data at the frame and
/// physical layers
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct DecodeLevel {
    /// decoding of frames (MBAP header / RTU / ASCII envelopes)
    pub frame: FrameDecodeLevel,
    /// logging of physical layer read/write
    pub physical: PhysDecodeLevel,
}

/// Controls how transmitted and received frames are decoded at the INFO log level
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FrameDecodeLevel {
    /// Decode nothing
    #[default]
    Nothing,
    /// Decode the envelope fields
    Header,
    /// Decode the envelope fields and the raw payload as hexadecimal
    Payload,
}

/// Controls how data transmitted at the physical layer is logged
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PhysDecodeLevel {
    /// Log nothing
    #[default]
    Nothing,
    /// Log only the length of data that is sent and received
    Length,
    /// Log the length and the actual data that is sent and received
    Data,
}

impl DecodeLevel {
    /// construct a `DecodeLevel` with nothing enabled
    pub fn nothing() -> Self {
        Self::default()
    }

    pub fn new(frame: FrameDecodeLevel, physical: PhysDecodeLevel) -> Self {
        DecodeLevel { frame, physical }
    }
}

impl From<FrameDecodeLevel> for DecodeLevel {
    fn from(frame: FrameDecodeLevel) -> Self {
        Self {
            frame,
            physical: PhysDecodeLevel::Nothing,
        }
    }
}

impl FrameDecodeLevel {
    pub(crate) fn enabled(&self) -> bool {
        !matches!(self, FrameDecodeLevel::Nothing)
    }

    pub(crate) fn payload_enabled(&self) -> bool {
        matches!(self, FrameDecodeLevel::Payload)
    }
}

impl PhysDecodeLevel {
    pub(crate) fn enabled(&self) -> bool {
        !matches!(self, PhysDecodeLevel::Nothing)
    }

    pub(crate) fn data_enabled(&self) -> bool {
        matches!(self, PhysDecodeLevel::Data)
    }
}

const BYTES_PER_DECODE_LINE: usize = 18;

pub(crate) fn format_bytes(f: &mut std::fmt::Formatter, bytes: &[u8]) -> std::fmt::Result {
    use std::fmt::Write;
    for chunk in bytes.chunks(BYTES_PER_DECODE_LINE) {
        writeln!(f)?;
        let mut first = true;
        for byte in chunk {
            if !first {
                f.write_char(' ')?;
            }
            first = false;
            write!(f, "{byte:02X?}")?;
        }
    }
    Ok(())
}
