// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use byteorder::{BigEndian, ByteOrder};

/// Pack words (u16 values) into a byte buffer, big-endian.
///
/// It returns the number of bytes written.
pub fn write_words(words: &[Word], target: &mut [u8]) -> Result<usize, Error> {
    let len = words.len() * 2;
    if len > target.len() {
        return Err(Error::BufferSize);
    }
    BigEndian::write_u16_into(words, &mut target[..len]);
    Ok(len)
}

/// Unpack big-endian byte pairs into words.
///
/// It returns the number of words written.
pub fn read_words(bytes: &[u8], target: &mut [Word]) -> Result<usize, Error> {
    if bytes.len() % 2 != 0 {
        return Err(Error::LengthMismatch(bytes.len(), bytes.len() + 1));
    }
    let count = bytes.len() / 2;
    if count > target.len() {
        return Err(Error::BufferSize);
    }
    BigEndian::read_u16_into(bytes, &mut target[..count]);
    Ok(count)
}
