use crate::common::checksum;
use crate::common::function::FunctionCode;
use crate::exception::ExceptionCode;

/// function code a frame carries until a real request is encoded into it;
/// also the code reported on a response timeout
pub(crate) const SENTINEL_FUNCTION_CODE: u8 = 0x80;

/// MBAP transaction id counter, one per codec instance
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub(crate) struct TxId {
    value: u16,
}

impl TxId {
    #[cfg(test)]
    pub(crate) fn new(value: u16) -> Self {
        TxId { value }
    }

    /// return the current id and advance, wrapping at the u16 boundary
    pub(crate) fn next(&mut self) -> u16 {
        let ret = self.value;
        self.value = self.value.wrapping_add(1);
        ret
    }
}

/// Protocol Data Unit: the framing-independent payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// raw function code; bit 7 set marks an exception response
    pub function: u8,
    pub data: Vec<u8>,
}

impl Pdu {
    pub fn new(function: FunctionCode) -> Self {
        Pdu {
            function: function.get_value(),
            data: Vec::new(),
        }
    }

    pub(crate) fn raw(function: u8) -> Self {
        Pdu {
            function,
            data: Vec::new(),
        }
    }

    pub fn is_exception(&self) -> bool {
        self.function & 0x80 != 0
    }
}

/// Application Data Unit: the complete on-wire frame
///
/// Holds one named byte section per frame region so the serializer and the
/// decoder agree on ordering. Sections a variant does not use stay empty and
/// contribute nothing to [`Adu::bytes`]. The ASCII codec hex-expands the
/// `header`, `function`, `data` and `err` sections in place, which is why the
/// function code is a section rather than a bare byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adu {
    /// start-of-frame delimiter (ASCII only)
    pub sof: Vec<u8>,
    /// MBAP header, or the single slave id byte for RTU/ASCII
    pub header: Vec<u8>,

    // MBAP header fields, parsed out of `header` on decode
    pub transaction_id: u16,
    pub protocol_id: u16,
    pub length: u16,
    pub slave_id: u8,

    /// function code section; one byte in binary form, two on the ASCII wire
    pub function: Vec<u8>,
    /// PDU data section
    pub data: Vec<u8>,

    /// checksum trailer: two CRC bytes (RTU) or one LRC byte (ASCII)
    pub err: Vec<u8>,
    /// parsed CRC value (RTU only)
    pub crc: u16,
    /// end-of-frame delimiter (ASCII only)
    pub eof: Vec<u8>,

    /// set when the function code indicates an exception
    pub exception: Option<ExceptionCode>,
    /// set by the client engine when no response arrived in time
    pub timeout: bool,
}

impl Adu {
    /// Wrap a PDU for encoding. Without one, the frame is seeded with the
    /// sentinel function code so an un-encoded frame fails downstream checks
    /// instead of passing silently.
    pub fn new(pdu: Option<Pdu>) -> Self {
        let pdu = pdu.unwrap_or_else(|| Pdu::raw(SENTINEL_FUNCTION_CODE));
        Adu {
            sof: Vec::new(),
            header: Vec::new(),
            transaction_id: 0,
            protocol_id: 0,
            length: 0,
            slave_id: 0,
            function: vec![pdu.function],
            data: pdu.data,
            err: Vec::new(),
            crc: 0,
            eof: Vec::new(),
            exception: None,
            timeout: false,
        }
    }

    /// the frame the engine returns when the transport deadline expires
    pub(crate) fn timeout_sentinel() -> Self {
        let mut adu = Adu::new(None);
        adu.timeout = true;
        adu
    }

    /// serialize: `sof + header + function + data + err + eof`
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.sof.len()
                + self.header.len()
                + self.function.len()
                + self.data.len()
                + self.err.len()
                + self.eof.len(),
        );
        out.extend_from_slice(&self.sof);
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.function);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.err);
        out.extend_from_slice(&self.eof);
        out
    }

    /// first byte of the function section; meaningful on binary-form frames
    pub fn function_code(&self) -> u8 {
        self.function.first().copied().unwrap_or(SENTINEL_FUNCTION_CODE)
    }

    pub fn is_exception(&self) -> bool {
        self.function_code() & 0x80 != 0
    }

    /// the embedded PDU of a binary-form frame
    pub fn pdu(&self) -> Pdu {
        Pdu {
            function: self.function_code(),
            data: self.data.clone(),
        }
    }

    /// compute the CRC over the current serialization and install it as the
    /// checksum trailer, high byte first
    pub(crate) fn error_crc(&mut self) {
        // serialize without a stale trailer
        self.err.clear();
        let crc = checksum::crc16(&self.bytes());
        self.crc = crc;
        self.err = crc.to_be_bytes().to_vec();
    }

    /// compute the LRC over the current serialization and install it as the
    /// checksum trailer; call before the delimiters and hex encoding go on
    pub(crate) fn error_lrc(&mut self) {
        self.err.clear();
        let lrc = checksum::lrc8(&self.bytes());
        self.err = vec![lrc];
    }

    /// byte count field of a decoded read response
    pub fn byte_count(&self) -> Option<u8> {
        if self.is_exception() {
            return None;
        }
        self.data.first().copied()
    }

    /// decoded read-response data without the leading byte count
    pub fn payload(&self) -> &[u8] {
        if self.is_exception() {
            return &[];
        }
        match self.data.split_first() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    pub fn exception_code(&self) -> Option<u8> {
        self.exception.map(ExceptionCode::to_u8)
    }

    pub fn exception_text(&self) -> Option<&'static str> {
        self.exception.map(ExceptionCode::description)
    }
}
