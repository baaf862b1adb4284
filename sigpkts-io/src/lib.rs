// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading and writing `sigpkts` packets over byte streams.
//!
//! Self-delimiting entities (IPv4 datagrams, SCTP chunks, chunk parameters and error causes)
//! are read with [`read_framed()`], which learns the frame size from a short prefix. Entities
//! whose size is carried by an enclosing layer (ICMP messages, SCTP packets) are read with
//! [`read_sized()`]. Every decoded value owns its data, so it may be held across `.await` points
//! or sent to another thread.
//!
//! Asynchronous versions of each function live in the [`tokio`](crate::tokio) and
//! [`async_std`](crate::async_std) modules, enabled by the features of the same name.

#![forbid(unsafe_code)]
// Show required features on docs.rs.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[cfg(feature = "async-std")]
pub mod async_std;
#[cfg(feature = "tokio")]
pub mod tokio;

use std::io::{self, Read, Write};

use sigpkts::error::ValidationError;
use sigpkts::layers::traits::{DecodeOwned, Framed, ToBytes};
use thiserror::Error;

/// The largest frame any reader in this crate will buffer.
///
/// Length fields are 16 bits wide; padding can push an SCTP chunk one byte past that.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize + 1;

/// An error encountered while reading or writing packets on a stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("frame of {length} bytes exceeds the 65536-byte maximum")]
    FrameTooLong { length: usize },
}

/// Reads a single self-delimiting entity from `reader`.
pub fn read_framed<T, R>(reader: &mut R) -> Result<T, StreamError>
where
    T: Framed + DecodeOwned,
    R: Read,
{
    let mut frame = vec![0; T::PREFIX_LEN];
    reader.read_exact(&mut frame)?;
    let len = frame_len::<T>(&frame)?;
    frame.resize(len, 0);
    reader.read_exact(&mut frame[T::PREFIX_LEN..])?;
    decode(&frame)
}

/// Reads exactly `len` bytes from `reader` and decodes them as a single entity.
pub fn read_sized<T, R>(reader: &mut R, len: usize) -> Result<T, StreamError>
where
    T: DecodeOwned,
    R: Read,
{
    check_len(len)?;
    let mut frame = vec![0; len];
    reader.read_exact(&mut frame)?;
    decode(&frame)
}

/// Encodes `packet` and writes it to `writer` in full.
pub fn write_packet<T, W>(writer: &mut W, packet: &T) -> Result<(), StreamError>
where
    T: ToBytes,
    W: Write,
{
    let bytes = packet.to_bytes();
    writer.write_all(&bytes)?;
    tracing::trace!(len = bytes.len(), "wrote packet");
    Ok(())
}

/// Determines the size of a frame from its prefix.
pub(crate) fn frame_len<T: Framed>(prefix: &[u8]) -> Result<usize, StreamError> {
    let len = T::frame_len(prefix).map_err(|e| {
        tracing::debug!(error = %e, "invalid frame prefix");
        e
    })?;
    check_len(len)?;
    // Framed lengths always cover the prefix itself.
    Ok(len.max(T::PREFIX_LEN))
}

pub(crate) fn check_len(len: usize) -> Result<(), StreamError> {
    if len > MAX_FRAME_LEN {
        tracing::debug!(len, "frame too long");
        Err(StreamError::FrameTooLong { length: len })
    } else {
        Ok(())
    }
}

pub(crate) fn decode<T: DecodeOwned>(frame: &[u8]) -> Result<T, StreamError> {
    tracing::trace!(len = frame.len(), "read frame");
    T::decode_owned(frame).map_err(|e| {
        tracing::debug!(error = %e, len = frame.len(), "failed to decode frame");
        StreamError::Validation(e)
    })
}
