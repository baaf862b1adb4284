// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Generic Type-Length-Value framing with 4-byte padding.
//!
//! SCTP chunk parameters and error causes share this layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-------------------------------+-------------------------------+
//! |             Type              |            Length             |
//! +-------------------------------+-------------------------------+
//! |                      Value (Length - 4 bytes)                 |
//! |                               +-------------------------------+
//! |                               |        Padding (0-3 bytes)    |
//! +-------------------------------+-------------------------------+
//! ```
//!
//! The Length field covers the 4-byte header and the value, but not the padding. Padding bytes
//! are skipped on decode without being inspected.

use std::borrow::Cow;
use std::ops::Deref;

use crate::error::{LengthField, ValidationError};
use crate::layers::traits::IntoOwned;
use crate::utils;

use sigpkts_common::BufferWrite;

/// Size of the Type and Length fields that begin every TLV.
pub const TLV_HEADER_LEN: usize = 4;

/// The opaque value of a variable-length TLV.
///
/// A value can only be built if the TLV holding it fits a 16-bit Length field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TlvValue<'a>(Cow<'a, [u8]>);

impl<'a> TlvValue<'a> {
    /// The longest value a TLV can carry.
    pub const MAX_LEN: usize = u16::MAX as usize - TLV_HEADER_LEN;

    pub fn new(value: impl Into<Cow<'a, [u8]>>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.len() > Self::MAX_LEN {
            return Err(ValidationError::ValueOutOfRange {
                field: "SCTP TLV value length",
                value: u32::try_from(value.len()).unwrap_or(u32::MAX),
            });
        }
        Ok(Self(value))
    }

    /// Wraps the value of a decoded TLV, which its own Length field already bounds.
    #[inline]
    pub(crate) fn decoded(value: &'a [u8]) -> Self {
        Self(Cow::Borrowed(value))
    }

    #[inline]
    pub fn into_inner(self) -> Cow<'a, [u8]> {
        self.0
    }

}

impl IntoOwned for TlvValue<'_> {
    type Owned = TlvValue<'static>;

    #[inline]
    fn into_owned(self) -> Self::Owned {
        TlvValue(Cow::Owned(self.0.into_owned()))
    }
}

impl Deref for TlvValue<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for TlvValue<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A single undecoded TLV borrowed from a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tlv<'a> {
    tlv_type: u16,
    value: &'a [u8],
}

impl<'a> Tlv<'a> {
    /// Splits the first TLV off the front of `bytes`, returning it along with the bytes that
    /// follow its padding.
    ///
    /// `field` selects which [`LengthField`] is reported if the length is inconsistent.
    pub fn split(
        bytes: &'a [u8],
        field: LengthField,
    ) -> Result<(Tlv<'a>, &'a [u8]), ValidationError> {
        let (Some(tlv_type), Some(length)) = (
            utils::get_array(bytes, 0).map(|&a| u16::from_be_bytes(a)),
            utils::get_array(bytes, 2).map(|&a| u16::from_be_bytes(a)),
        ) else {
            return Err(ValidationError::HeaderIncomplete {
                layer: layer_name(field),
                required: TLV_HEADER_LEN,
                available: bytes.len(),
            });
        };

        let length = length as usize;
        if length < TLV_HEADER_LEN || length > bytes.len() {
            return Err(ValidationError::LengthInvalid { field, length });
        }

        // A final TLV may legitimately omit its padding when it ends the enclosing structure.
        let advance = utils::padded_length::<4>(length).min(bytes.len());
        Ok((
            Tlv {
                tlv_type,
                value: &bytes[TLV_HEADER_LEN..length],
            },
            &bytes[advance..],
        ))
    }

    #[inline]
    pub fn tlv_type(&self) -> u16 {
        self.tlv_type
    }

    /// The value bytes, excluding the header and any padding.
    #[inline]
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// The value of the Length field.
    #[inline]
    pub fn unpadded_len(&self) -> usize {
        TLV_HEADER_LEN + self.value.len()
    }
}

/// An iterator over a contiguous run of TLVs.
///
/// Iteration stops after the first error.
#[derive(Clone, Debug)]
pub struct TlvIter<'a> {
    bytes: &'a [u8],
    field: LengthField,
}

impl<'a> TlvIter<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8], field: LengthField) -> Self {
        Self { bytes, field }
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = Result<Tlv<'a>, ValidationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }

        match Tlv::split(self.bytes, self.field) {
            Ok((tlv, rem)) => {
                self.bytes = rem;
                Some(Ok(tlv))
            }
            Err(e) => {
                self.bytes = &[];
                Some(Err(e))
            }
        }
    }
}

/// The Length field of a TLV sequence's enclosing structure, given each element's Length.
///
/// Every element but the last contributes its padded size; the last contributes its unpadded
/// size, since the enclosing length excludes trailing padding.
pub(crate) fn sequence_unpadded_len<I: IntoIterator<Item = usize>>(unpadded_lens: I) -> usize {
    let mut total = 0;
    let mut last_padding = 0;
    for len in unpadded_lens {
        let padded = utils::padded_length::<4>(len);
        total += padded;
        last_padding = padded - len;
    }
    total - last_padding
}

/// Writes a TLV whose value is produced by `write_value`, backfilling the Length field and
/// appending padding.
///
/// Returns the offset within `bytes` at which the unpadded TLV ends.
pub(crate) fn write_tlv<B: BufferWrite, F: FnOnce(&mut B)>(
    bytes: &mut B,
    tlv_type: u16,
    write_value: F,
) -> usize {
    let start = bytes.len();
    bytes.append(&tlv_type.to_be_bytes());
    bytes.append(&[0, 0]);
    write_value(bytes);
    let end = bytes.len();
    // Every value type is bounded at construction to fit the Length field.
    utils::backfill_u16(bytes, start + 2, (end - start) as u16);
    utils::pad_to_4(bytes, start);
    end
}

fn layer_name(field: LengthField) -> &'static str {
    match field {
        LengthField::ErrorCause => "SCTP error cause",
        _ => "SCTP chunk parameter",
    }
}
