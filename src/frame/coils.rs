// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

/// Number of coils held by one register word.
pub const COILS_PER_WORD: usize = 16;

/// Rule used to compute the byte count of packed coils.
///
/// Both rules lay the coils out identically: 16 coils per register word,
/// each word sent low byte first. They only differ in how many bytes go on
/// the wire when the last word is partially filled.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoilByteCount {
    /// `ceil(quantity / 8)` as defined by the Modbus application protocol.
    #[default]
    Standard,
    /// Two bytes per complete word plus a single byte for a partial word,
    /// whatever the number of coils in it.
    ///
    /// Matches slaves deployed against firmware that counts bytes this way.
    /// Quantities with more than 8 coils in the last word are truncated.
    Legacy,
}

impl CoilByteCount {
    /// Number of bytes used to transfer `quantity` coils.
    #[must_use]
    pub const fn byte_count(self, quantity: Quantity) -> usize {
        let quantity = quantity as usize;
        match self {
            Self::Standard => quantity.div_ceil(8),
            Self::Legacy => {
                let full = (quantity / COILS_PER_WORD) * 2;
                if quantity % COILS_PER_WORD > 0 {
                    full + 1
                } else {
                    full
                }
            }
        }
    }
}

/// Calculate the number of register words required for a given number of
/// coils.
#[must_use]
pub const fn coil_words(quantity: Quantity) -> usize {
    (quantity as usize).div_ceil(COILS_PER_WORD)
}

/// Pack coil words into `byte_count` bytes, low byte of each word first.
///
/// It returns the number of bytes written.
pub fn pack_coil_words(words: &[Word], byte_count: usize, bytes: &mut [u8]) -> Result<usize, Error> {
    if bytes.len() < byte_count || words.len() * 2 < byte_count {
        return Err(Error::BufferSize);
    }
    for (idx, byte) in bytes[..byte_count].iter_mut().enumerate() {
        let [lo, hi] = words[idx / 2].to_le_bytes();
        *byte = if idx % 2 == 0 { lo } else { hi };
    }
    Ok(byte_count)
}

/// Unpack coil bytes into register words, low byte of each word first.
///
/// A trailing odd byte fills only the low half of the last word.
/// It returns the number of words written.
pub fn unpack_coil_words(bytes: &[u8], words: &mut [Word]) -> Result<usize, Error> {
    let count = bytes.len().div_ceil(2);
    if words.len() < count {
        return Err(Error::BufferSize);
    }
    for (word, chunk) in words.iter_mut().zip(bytes.chunks(2)) {
        let lo = chunk[0];
        let hi = chunk.get(1).copied().unwrap_or(0);
        *word = Word::from_le_bytes([lo, hi]);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn standard_byte_count() {
        let rule = CoilByteCount::Standard;
        assert_eq!(rule.byte_count(1), 1);
        assert_eq!(rule.byte_count(8), 1);
        assert_eq!(rule.byte_count(9), 2);
        assert_eq!(rule.byte_count(16), 2);
        assert_eq!(rule.byte_count(20), 3);
        assert_eq!(rule.byte_count(26), 4);
    }

    #[test]
    fn legacy_byte_count() {
        let rule = CoilByteCount::Legacy;
        assert_eq!(rule.byte_count(1), 1);
        assert_eq!(rule.byte_count(8), 1);
        // only one byte for the partial word, even with 10 coils in it
        assert_eq!(rule.byte_count(10), 1);
        assert_eq!(rule.byte_count(16), 2);
        assert_eq!(rule.byte_count(20), 3);
        assert_eq!(rule.byte_count(26), 3);
        assert_eq!(rule.byte_count(32), 4);
    }

    #[test]
    fn words_for_coils() {
        assert_eq!(coil_words(1), 1);
        assert_eq!(coil_words(16), 1);
        assert_eq!(coil_words(17), 2);
        assert_eq!(coil_words(2000), 125);
    }

    #[test]
    fn pack_coil_words_into_byte_array() {
        let buf = &mut [0; 4];
        assert_eq!(pack_coil_words(&[0xCD01], 1, buf).unwrap(), 1);
        assert_eq!(buf, &[0x01, 0, 0, 0]);

        let buf = &mut [0; 4];
        assert_eq!(pack_coil_words(&[0xCD01], 2, buf).unwrap(), 2);
        assert_eq!(buf, &[0x01, 0xCD, 0, 0]);

        let buf = &mut [0; 4];
        assert_eq!(pack_coil_words(&[0xCD01, 0x0003], 3, buf).unwrap(), 3);
        assert_eq!(buf, &[0x01, 0xCD, 0x03, 0]);

        assert_eq!(
            pack_coil_words(&[0xFFFF], 3, &mut [0; 4]).err().unwrap(),
            Error::BufferSize
        );
        assert_eq!(
            pack_coil_words(&[0xFFFF], 2, &mut [0; 1]).err().unwrap(),
            Error::BufferSize
        );
    }

    #[test]
    fn unpack_coil_words_from_byte_array() {
        let words = &mut [0; 2];
        assert_eq!(unpack_coil_words(&[0x01, 0xCD, 0x03], words).unwrap(), 2);
        assert_eq!(words, &[0xCD01, 0x0003]);

        let words = &mut [0xFFFF; 1];
        assert_eq!(unpack_coil_words(&[0b101], words).unwrap(), 1);
        assert_eq!(words, &[0b101]);

        assert_eq!(
            unpack_coil_words(&[1, 2, 3], &mut [0; 1]).err().unwrap(),
            Error::BufferSize
        );
        assert_eq!(unpack_coil_words(&[], &mut []).unwrap(), 0);
    }
}
