//! Little-endian helpers shared by the `to_bytes` / `from_bytes` encodings.

use crate::bitbuf::BitBuffer;
use crate::error::{Error, Result};

/// Cursor over an encoded byte slice.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    off: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, off: 0 }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .off
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::InvalidEncoding("unexpected end of input".to_string()))?;
        let slice = &self.bytes[self.off..end];
        self.off = end;
        Ok(slice)
    }

    pub(crate) fn magic(&mut self, magic: &[u8; 8], what: &str) -> Result<()> {
        if self.take(8)? != magic {
            return Err(Error::InvalidEncoding(format!("bad magic for {what}")));
        }
        Ok(())
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn usize(&mut self) -> Result<usize> {
        let v = self.u64()?;
        usize::try_from(v)
            .map_err(|_| Error::InvalidEncoding(format!("length {v} does not fit in usize")))
    }

    /// Read a length-prefixed bit buffer written by [`put_bits`].
    pub(crate) fn bits(&mut self) -> Result<BitBuffer> {
        let len = self.usize()?;
        let num_words = len.div_ceil(64);
        // Bound allocation against remaining input to prevent allocation bombs.
        if num_words.saturating_mul(8) > self.bytes.len() - self.off {
            return Err(Error::InvalidEncoding(format!(
                "bit buffer of {len} bits too large for input"
            )));
        }
        let mut words = Vec::with_capacity(num_words);
        for _ in 0..num_words {
            words.push(self.u64()?);
        }
        BitBuffer::from_parts(words, len)
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.off
    }

    pub(crate) fn finish(self, what: &str) -> Result<()> {
        if self.off != self.bytes.len() {
            return Err(Error::InvalidEncoding(format!("trailing bytes after {what}")));
        }
        Ok(())
    }
}

pub(crate) fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Write `bits` as its length in bits followed by its packed words.
pub(crate) fn put_bits(out: &mut Vec<u8>, bits: &BitBuffer) {
    put_u64(out, bits.len() as u64);
    for &w in bits.words() {
        put_u64(out, w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_roundtrip_and_truncation() {
        let mut buf = BitBuffer::new();
        buf.append_bits(0x1234_5678_9abc, 48);
        buf.append_bits(0xff, 30);
        let mut out = Vec::new();
        put_bits(&mut out, &buf);
        put_u64(&mut out, 7);

        let mut r = ByteReader::new(&out);
        assert_eq!(r.bits().unwrap(), buf);
        assert_eq!(r.u64().unwrap(), 7);
        assert_eq!(r.remaining(), 0);
        r.finish("test").unwrap();

        let mut r = ByteReader::new(&out[..out.len() - 9]);
        assert!(r.bits().is_err());
    }

    #[test]
    fn rejects_huge_length_prefix() {
        let mut out = Vec::new();
        put_u64(&mut out, u64::MAX / 2);
        let mut r = ByteReader::new(&out);
        assert!(matches!(r.bits(), Err(Error::InvalidEncoding(_))));
    }
}
