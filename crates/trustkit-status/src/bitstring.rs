//! Packed, growable bitstring.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::StatusListError;

/// A fixed-length sequence of bits packed most-significant-bit first.
///
/// Bits past `len` in the final byte are always zero, so growing the
/// string never exposes stale flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    bytes: Vec<u8>,
    len: usize,
}

fn byte_len(bits: usize) -> usize {
    bits.div_ceil(8)
}

fn mask(index: usize) -> u8 {
    0x80 >> (index % 8)
}

impl BitString {
    /// `len` zero bits.
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0; byte_len(len)],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bytes[index / 8] & mask(index) != 0)
    }

    /// Set or clear one bit. Returns the previous value.
    pub fn set(&mut self, index: usize, value: bool) -> Result<bool, StatusListError> {
        let previous = self.get(index).ok_or(StatusListError::IndexOutOfRange {
            index,
            capacity: self.len,
        })?;
        let byte = &mut self.bytes[index / 8];
        if value {
            *byte |= mask(index);
        } else {
            *byte &= !mask(index);
        }
        Ok(previous)
    }

    /// Append `additional` zero bits, keeping every existing bit.
    pub fn grow(&mut self, additional: usize) {
        self.len += additional;
        self.bytes.resize(byte_len(self.len), 0);
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Indices of set bits, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.bytes[i / 8] & mask(i) != 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard padded base64 of the packed bytes.
    pub fn encode(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Inverse of [`encode`](Self::encode) for a string of `len` bits.
    ///
    /// # Errors
    ///
    /// [`StatusListError::InvalidEncoding`] if the text is not base64, has
    /// the wrong byte length for `len`, or sets padding bits past `len`.
    pub fn decode(encoded: &str, len: usize) -> Result<Self, StatusListError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| StatusListError::InvalidEncoding(e.to_string()))?;
        if bytes.len() != byte_len(len) {
            return Err(StatusListError::InvalidEncoding(format!(
                "{} bytes cannot hold exactly {len} bits",
                bytes.len()
            )));
        }
        if len % 8 != 0 {
            if let Some(last) = bytes.last() {
                let used = 0xffu8 << (8 - len % 8);
                if last & !used != 0 {
                    return Err(StatusListError::InvalidEncoding(
                        "bits set past the end of the list".to_string(),
                    ));
                }
            }
        }
        Ok(Self { bytes, len })
    }
}
