//! Bit-level reader and writer for the flat serialization format used by
//! compiled Plutus programs.
//!
//! Bits are written most significant first. Naturals are little-endian
//! 7-bit groups, each stored in 8 bits with the high bit marking that more
//! groups follow. Byte strings are preceded by filler and split into chunks
//! of at most 255 bytes, terminated by an empty chunk.

use crate::error::{Result, ScriptError};

const MAX_CHUNK: usize = 255;

/// Flat writer.
#[derive(Debug, Default)]
pub struct Encoder {
    buffer: Vec<u8>,
    current: u8,
    used_bits: u8,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bit(&mut self, bit: bool) {
        if bit {
            self.current |= 0x80 >> self.used_bits;
        }
        self.used_bits += 1;
        if self.used_bits == 8 {
            self.buffer.push(self.current);
            self.current = 0;
            self.used_bits = 0;
        }
    }

    /// Write the lowest `count` bits of `value`, most significant first.
    pub fn bits(&mut self, count: u8, value: u8) {
        for i in (0..count).rev() {
            self.bit((value >> i) & 1 == 1);
        }
    }

    pub fn byte(&mut self, value: u8) {
        self.bits(8, value);
    }

    /// Write a natural number as 7-bit groups.
    pub fn natural(&mut self, mut n: u64) {
        loop {
            let group = (n & 0x7f) as u8;
            n >>= 7;
            if n == 0 {
                self.byte(group);
                return;
            }
            self.byte(group | 0x80);
        }
    }

    /// Write pre-split 7-bit groups, least significant first.
    pub fn natural_groups(&mut self, groups: &[u8]) {
        let last = groups.len().saturating_sub(1);
        for (i, group) in groups.iter().enumerate() {
            let continuation = if i < last { 0x80 } else { 0 };
            self.byte((group & 0x7f) | continuation);
        }
    }

    /// Pad with zeros and a final one bit up to the next byte boundary.
    ///
    /// When already aligned this writes a whole `0x01` byte.
    pub fn filler(&mut self) {
        while self.used_bits != 7 {
            self.bit(false);
        }
        self.bit(true);
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.filler();
        for chunk in bytes.chunks(MAX_CHUNK) {
            self.byte(chunk.len() as u8);
            self.buffer.extend_from_slice(chunk);
        }
        self.byte(0);
    }

    /// Start of a list element.
    pub fn list_cons(&mut self) {
        self.bit(true);
    }

    /// End of a list.
    pub fn list_nil(&mut self) {
        self.bit(false);
    }

    /// Finish the stream. The caller must have written the final filler.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.used_bits != 0 {
            return Err(ScriptError::FlatDecode {
                position: self.buffer.len() * 8 + usize::from(self.used_bits),
                reason: "stream not byte aligned".into(),
            });
        }
        Ok(self.buffer)
    }
}

/// Flat reader over a byte slice.
#[derive(Debug)]
pub struct Decoder<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Current bit offset.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn error(&self, reason: impl Into<String>) -> ScriptError {
        ScriptError::FlatDecode {
            position: self.position,
            reason: reason.into(),
        }
    }

    pub fn bit(&mut self) -> Result<bool> {
        let byte = self
            .buffer
            .get(self.position / 8)
            .ok_or_else(|| self.error("unexpected end of input"))?;
        let bit = byte & (0x80 >> (self.position % 8)) != 0;
        self.position += 1;
        Ok(bit)
    }

    pub fn bits(&mut self, count: u8) -> Result<u8> {
        let mut value = 0u8;
        for _ in 0..count {
            value = (value << 1) | u8::from(self.bit()?);
        }
        Ok(value)
    }

    pub fn byte(&mut self) -> Result<u8> {
        self.bits(8)
    }

    /// Read the raw 7-bit groups of a natural, least significant first.
    pub fn natural_groups(&mut self) -> Result<Vec<u8>> {
        let mut groups = Vec::new();
        loop {
            let byte = self.byte()?;
            groups.push(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok(groups);
            }
        }
    }

    pub fn natural(&mut self) -> Result<u64> {
        let start = self.position;
        let groups = self.natural_groups()?;
        let mut n: u64 = 0;
        for (i, group) in groups.iter().enumerate() {
            let shift = i * 7;
            if shift >= 64 || (shift > 57 && u64::from(*group) >> (64 - shift) != 0) {
                return Err(ScriptError::FlatDecode {
                    position: start,
                    reason: "natural exceeds 64 bits".into(),
                });
            }
            n |= u64::from(*group) << shift;
        }
        Ok(n)
    }

    /// Skip zero bits up to and including a one bit on a byte boundary.
    pub fn filler(&mut self) -> Result<()> {
        while !self.bit()? {}
        if self.position % 8 != 0 {
            return Err(self.error("filler does not end on a byte boundary"));
        }
        Ok(())
    }

    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        self.filler()?;
        let mut out = Vec::new();
        loop {
            let len = usize::from(self.byte()?);
            if len == 0 {
                return Ok(out);
            }
            let start = self.position / 8;
            let chunk = self
                .buffer
                .get(start..start + len)
                .ok_or_else(|| self.error("byte string chunk past end of input"))?;
            out.extend_from_slice(chunk);
            self.position += len * 8;
        }
    }

    /// Read the bit that precedes each list element; false ends the list.
    pub fn list_next(&mut self) -> Result<bool> {
        self.bit()
    }

    pub fn is_exhausted(&self) -> bool {
        self.position == self.buffer.len() * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_filler_when_aligned_is_full_byte() {
        let mut enc = Encoder::new();
        enc.filler();
        assert_eq!(enc.finish().unwrap(), vec![0x01]);
    }

    #[test]
    fn test_filler_completes_partial_byte() {
        let mut enc = Encoder::new();
        enc.bits(4, 0b0011);
        enc.filler();
        assert_eq!(enc.finish().unwrap(), vec![0x31]);
    }

    #[test]
    fn test_natural_groups() {
        let mut enc = Encoder::new();
        enc.natural(0);
        enc.natural(127);
        enc.natural(128);
        let bytes = enc.finish().unwrap();
        assert_eq!(bytes, vec![0x00, 0x7f, 0x80, 0x01]);

        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.natural().unwrap(), 0);
        assert_eq!(dec.natural().unwrap(), 127);
        assert_eq!(dec.natural().unwrap(), 128);
        assert!(dec.is_exhausted());
    }

    #[test]
    fn test_bytes_chunking() {
        let data = vec![0x5a; 300];
        let mut enc = Encoder::new();
        enc.bytes(&data);
        let bytes = enc.finish().unwrap();
        // filler, 255-byte chunk, 45-byte chunk, terminator
        assert_eq!(bytes.len(), 1 + 1 + 255 + 1 + 45 + 1);
        assert_eq!(bytes[1], 255);
        assert_eq!(bytes[257], 45);

        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.bytes().unwrap(), data);
        assert!(dec.is_exhausted());
    }

    #[test]
    fn test_unaligned_finish_rejected() {
        let mut enc = Encoder::new();
        enc.bit(true);
        assert!(matches!(enc.finish(), Err(ScriptError::FlatDecode { .. })));
    }

    #[test]
    fn test_misaligned_filler_rejected() {
        let mut dec = Decoder::new(&[0b0100_0000]);
        assert!(matches!(dec.filler(), Err(ScriptError::FlatDecode { position: 2, .. })));

        let mut dec = Decoder::new(&[0b1000_0001]);
        dec.bit().unwrap();
        assert!(dec.filler().is_ok());
        assert!(dec.is_exhausted());
    }

    #[test]
    fn test_read_past_end() {
        let mut dec = Decoder::new(&[0x80]);
        assert_eq!(dec.bits(8).unwrap(), 0x80);
        assert!(dec.bit().is_err());
    }

    proptest! {
        #[test]
        fn prop_naturals_and_bytes_decode_back(
            lead in 0u8..8,
            n in any::<u64>(),
            data in proptest::collection::vec(any::<u8>(), 0..600),
        ) {
            let mut enc = Encoder::new();
            enc.bits(lead, 0);
            enc.natural(n);
            enc.bytes(&data);
            let bytes = enc.finish().unwrap();

            let mut dec = Decoder::new(&bytes);
            prop_assert_eq!(dec.bits(lead).unwrap(), 0);
            prop_assert_eq!(dec.natural().unwrap(), n);
            prop_assert_eq!(dec.bytes().unwrap(), data);
            prop_assert!(dec.is_exhausted());
        }
    }
}
