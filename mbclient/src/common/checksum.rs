const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_MODBUS);

/// CRC-16/MODBUS over the given bytes (poly 0xA001 reflected, init 0xFFFF)
pub(crate) fn crc16(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// LRC-8: twos complement of the 8-bit sum of the given bytes
pub(crate) fn lrc8(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    sum.wrapping_neg()
}

/// a frame body with its LRC appended sums to zero mod 256
pub(crate) fn lrc_sums_to_zero(bytes: &[u8]) -> bool {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)) == 0
}
