// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # General utility functions
//!
//! Byte-slice helpers shared by the layer codecs. None of these functions should be considered
//! stable--they may be removed or changed at any release.

use crate::error::{LengthField, ValidationError};

use sigpkts_common::BufferWrite;

/// Sums `bytes` as big-endian 16-bit words using one's-complement addition.
///
/// A trailing odd byte is treated as the high half of a zero-padded word.
pub fn ones_complement_16bit(bytes: &[u8]) -> u16 {
    let mut res: u16 = 0;
    let mut chunks = bytes.chunks_exact(2);
    for word in &mut chunks {
        res = ones_complement_add(res, u16::from_be_bytes([word[0], word[1]]));
    }

    if let [last] = chunks.remainder() {
        res = ones_complement_add(res, (*last as u16) << 8);
    }

    res
}

#[inline]
pub fn ones_complement_add(a: u16, b: u16) -> u16 {
    let new = a.wrapping_add(b);
    if new < a {
        new.wrapping_add(1)
    } else {
        new
    }
}

#[inline]
pub(crate) fn to_array<const T: usize>(bytes: &[u8], start: usize) -> Option<[u8; T]> {
    Some(*get_array(bytes, start)?)
}

#[inline]
pub fn get_array<const T: usize>(bytes: &[u8], start: usize) -> Option<&[u8; T]> {
    bytes.get(start..start + T)?.try_into().ok()
}

#[inline]
pub(crate) fn padded_length<const T: usize>(unpadded_len: usize) -> usize {
    unpadded_len + ((T - (unpadded_len % T)) % T)
}

/// Reads a big-endian `u16` at `start`. Callers must have checked the bounds already.
#[inline]
pub(crate) fn be_u16(bytes: &[u8], start: usize) -> u16 {
    u16::from_be_bytes(to_array(bytes, start).unwrap_or_default())
}

/// Reads a big-endian `u32` at `start`. Callers must have checked the bounds already.
#[inline]
pub(crate) fn be_u32(bytes: &[u8], start: usize) -> u32 {
    u32::from_be_bytes(to_array(bytes, start).unwrap_or_default())
}

/// Returns an error unless `value` is exactly `expected` bytes long.
#[inline]
pub(crate) fn exact_len(
    value: &[u8],
    expected: usize,
    field: LengthField,
    reported: usize,
) -> Result<(), ValidationError> {
    if value.len() == expected {
        Ok(())
    } else {
        Err(ValidationError::LengthInvalid {
            field,
            length: reported,
        })
    }
}

/// Writes `len` into the two bytes at `pos` of an already-written buffer.
#[inline]
pub(crate) fn backfill_u16<B: BufferWrite>(bytes: &mut B, pos: usize, len: u16) {
    bytes.as_mut_slice()[pos..pos + 2].copy_from_slice(&len.to_be_bytes());
}

/// Pads the buffer with zeros up to the next multiple of 4 relative to `start`.
#[inline]
pub(crate) fn pad_to_4<B: BufferWrite>(bytes: &mut B, start: usize) {
    let written = bytes.len() - start;
    bytes.append_zeros(padded_length::<4>(written) - written);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_lengths() {
        assert_eq!(padded_length::<4>(0), 0);
        assert_eq!(padded_length::<4>(5), 8);
        assert_eq!(padded_length::<4>(8), 8);
        assert_eq!(padded_length::<4>(11), 12);
    }

    #[test]
    fn ones_complement_odd_trailing_byte() {
        assert_eq!(ones_complement_16bit(&[0x12, 0x34, 0x56]), 0x1234 + 0x5600);
        assert_eq!(ones_complement_16bit(&[0xff, 0xff, 0x00, 0x01]), 0x0001);
    }

    #[test]
    fn padding_relative_to_start() {
        let mut bytes = vec![9, 9, 9];
        let start = bytes.len();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
        pad_to_4(&mut bytes, start);
        assert_eq!(bytes.len() - start, 8);
        assert_eq!(&bytes[start + 5..], &[0, 0, 0]);
    }
}
