/// field lengths shared by the serializer and the decoder
pub mod len {
    /// slave id byte (RTU/ASCII header, last MBAP header byte)
    pub const SLAVE_ID: usize = 1;
    /// function code byte
    pub const FUNCTION_CODE: usize = 1;
    /// CRC-16 trailer (RTU)
    pub const CRC: usize = 2;
    /// LRC-8 trailer (ASCII, binary form)
    pub const LRC: usize = 1;
    /// start-of-frame delimiter (ASCII)
    pub const SOF: usize = 1;
    /// end-of-frame delimiter (ASCII)
    pub const EOF: usize = 2;
    /// full MBAP header
    pub const MBAP_HEADER: usize = 7;
    /// MBAP transaction id field
    pub const TRANSACTION_ID: usize = 2;
    /// MBAP protocol id field
    pub const PROTOCOL_ID: usize = 2;
    /// MBAP length field
    pub const LENGTH_FIELD: usize = 2;
}

/// smallest frame each variant can produce on the wire
pub mod min_frame {
    use super::len;

    pub const MBAP: usize = len::MBAP_HEADER + len::FUNCTION_CODE;
    pub const RTU: usize = len::SLAVE_ID + len::FUNCTION_CODE + len::CRC;
    /// wire form: `:` + hex slave + hex function code + hex LRC + CR LF
    pub const ASCII: usize =
        len::SOF + 2 * (len::SLAVE_ID + len::FUNCTION_CODE + len::LRC) + len::EOF;
    /// binary form after hex decoding, delimiters retained
    pub const ASCII_BINARY: usize =
        len::SOF + len::SLAVE_ID + len::FUNCTION_CODE + len::LRC + len::EOF;
}

/// ASCII framing delimiters
pub mod ascii {
    pub const COLON: u8 = 0x3A;
    pub const CR: u8 = 0x0D;
    pub const LF: u8 = 0x0A;
}

pub mod mbap {
    /// the only protocol id assigned by the Modbus specification
    pub const PROTOCOL_ID: u16 = 0x0000;
}

pub mod limits {
    /// most bytes a transport consumes in a single read
    pub const MAX_READ_SIZE: usize = 256;
    /// connection attempts before `connect` gives up
    pub const CONNECT_RETRIES: usize = 5;
}
