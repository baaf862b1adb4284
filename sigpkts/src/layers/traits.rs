// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Traits shared by every wire entity in this crate.
//!
//! Decoding borrows: a value returned by [`FromBytes::from_bytes()`] keeps views into the input
//! buffer for any variable-length payload it does not need to transform. A decoded value that
//! must outlive its buffer (for instance, to be moved across an `.await` point or into another
//! thread) is converted with [`IntoOwned::into_owned()`], which is the single place where those
//! views are copied.

use crate::error::{SerializationError, ValidationError};

use sigpkts_common::{BufferMut, BufferWrite};

/// A trait for retrieving the encoded length (in bytes) of a wire entity.
pub trait LayerLength {
    /// The number of bytes [`ToBytes::to_bytes()`] produces for this value.
    ///
    /// For SCTP chunks and TLVs this includes trailing padding, even though the length field
    /// written on the wire does not.
    fn len(&self) -> usize;
}

/// A trait for decoding a wire entity from a byte slice.
pub trait FromBytes<'a>: Sized {
    /// Decodes and fully validates `bytes`, borrowing variable-length payloads from it.
    fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError>;
}

/// A trait for serializing a wire entity into its binary representation.
pub trait ToBytes: LayerLength {
    /// Appends the entity's byte representation to the given sink, computing any length and
    /// checksum fields along the way.
    fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B);

    /// Serializes the entity into a newly allocated vector.
    #[inline]
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        self.to_bytes_extended(&mut bytes);
        bytes
    }

    /// Serializes the entity into the unused portion of a caller-supplied buffer.
    ///
    /// Nothing is written if the buffer cannot hold the whole entity.
    #[inline]
    fn write_into(&self, buf: &mut BufferMut<'_>) -> Result<(), SerializationError> {
        let required = self.len();
        if buf.remaining() < required {
            return Err(SerializationError::InsufficientBuffer {
                required,
                available: buf.remaining(),
            });
        }

        self.to_bytes_extended(buf);
        Ok(())
    }
}

/// Converts a value that may borrow from a decode buffer into one that owns all of its data.
pub trait IntoOwned {
    type Owned: 'static;

    fn into_owned(self) -> Self::Owned;
}

/// Decoding directly into a value with no ties to the source buffer.
pub trait DecodeOwned: Sized + 'static {
    fn decode_owned(bytes: &[u8]) -> Result<Self, ValidationError>;
}

/// Entities that announce their own total size within a fixed-length prefix.
///
/// Stream readers use this to know how many bytes to buffer before handing a frame to
/// [`FromBytes::from_bytes()`].
pub trait Framed {
    /// The number of leading bytes needed to learn the size of the whole frame.
    const PREFIX_LEN: usize;

    /// Returns the total number of bytes the frame occupies on the wire, given its first
    /// [`PREFIX_LEN`](Framed::PREFIX_LEN) bytes.
    fn frame_len(prefix: &[u8]) -> Result<usize, ValidationError>;
}

/// Implements [`DecodeOwned`] for the `'static` form of a borrowing entity.
macro_rules! impl_decode_owned {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $crate::layers::traits::DecodeOwned for $ty<'static> {
                #[inline]
                fn decode_owned(bytes: &[u8]) -> Result<Self, $crate::error::ValidationError> {
                    use $crate::layers::traits::{FromBytes, IntoOwned};
                    $ty::from_bytes(bytes).map(IntoOwned::into_owned)
                }
            }
        )*
    };
}

pub(crate) use impl_decode_owned;
