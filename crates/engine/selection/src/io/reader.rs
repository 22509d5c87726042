//! Cursor over a byte slice with bounds-checked big-endian reads

use super::CodecError;

/// Sequential reader for the selection wire format
///
/// Every read checks the remaining length first and fails with
/// [`CodecError::Truncated`] instead of panicking. A failed read leaves the
/// cursor where it was.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Current offset from the start of the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(CodecError::Truncated {
                needed: self.pos.saturating_add(len),
                available: self.data.len(),
            }),
        }
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a 4-byte big-endian signed integer
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a boolean byte; only 0 and 1 are accepted
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::InvalidBool { value }),
        }
    }

    /// Fail unless the whole buffer has been consumed
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(CodecError::TrailingBytes { count }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian() {
        let data = [0x00, 0x00, 0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFD, 0x01];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_i32().unwrap(), 0x0102);
        assert_eq!(reader.read_i32().unwrap(), -3);
        assert!(reader.read_bool().unwrap());
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_truncated_read_keeps_position() {
        let data = [0x00, 0x01, 0x02];
        let mut reader = ByteReader::new(&data);
        assert_eq!(
            reader.read_i32(),
            Err(CodecError::Truncated {
                needed: 4,
                available: 3
            })
        );
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u8().unwrap(), 0);
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.finish(), Err(CodecError::TrailingBytes { count: 2 }));
    }

    #[test]
    fn test_invalid_bool() {
        let mut reader = ByteReader::new(&[2]);
        assert_eq!(reader.read_bool(), Err(CodecError::InvalidBool { value: 2 }));
    }
}
