use crate::error::AduParseError;

/// read-only cursor over a response buffer
///
/// Advancing consumes bytes; running past the end is an error, never a panic.
pub(crate) struct ReadCursor<'a> {
    src: &'a [u8],
}

impl<'a> ReadCursor<'a> {
    pub(crate) fn new(src: &'a [u8]) -> ReadCursor<'a> {
        ReadCursor { src }
    }

    pub(crate) fn len(&self) -> usize {
        self.src.len()
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, AduParseError> {
        match self.src.split_first() {
            Some((first, rest)) => {
                self.src = rest;
                Ok(*first)
            }
            None => Err(AduParseError::InsufficientBytes),
        }
    }

    pub(crate) fn read_u16_be(&mut self) -> Result<u16, AduParseError> {
        let high = self.read_u8()?;
        let low = self.read_u8()?;
        Ok((high as u16) << 8 | (low as u16))
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], AduParseError> {
        match (self.src.get(0..count), self.src.get(count..)) {
            (Some(first), Some(rest)) => {
                self.src = rest;
                Ok(first)
            }
            _ => Err(AduParseError::InsufficientBytes),
        }
    }

    /// require exactly `count` unread bytes, the frame trailer
    pub(crate) fn expect_remaining(&self, count: usize) -> Result<(), AduParseError> {
        if self.len() == count {
            Ok(())
        } else if self.len() < count {
            Err(AduParseError::InsufficientBytes)
        } else {
            Err(AduParseError::TrailingBytes(self.len() - count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_in_order() {
        let mut cursor = ReadCursor::new(&[0xCA, 0xFE, 0x2A]);
        assert_eq!(cursor.read_u16_be(), Ok(0xCAFE));
        assert_eq!(cursor.read_u8(), Ok(0x2A));
        assert_eq!(cursor.read_u8(), Err(AduParseError::InsufficientBytes));
    }

    #[test]
    fn rejects_reads_past_the_end() {
        let mut cursor = ReadCursor::new(&[0x01]);
        assert_eq!(
            cursor.read_bytes(2),
            Err(AduParseError::InsufficientBytes)
        );
    }

    #[test]
    fn counts_trailing_bytes() {
        let mut cursor = ReadCursor::new(&[0x01, 0x02, 0x03]);
        cursor.read_u8().unwrap();
        assert_eq!(cursor.expect_remaining(2), Ok(()));
        assert_eq!(
            cursor.expect_remaining(1),
            Err(AduParseError::TrailingBytes(1))
        );
    }
}
