// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Byte buffers shared between the `sigpkts` crates.
//!
//! Encoders in `sigpkts` write through the [`BufferWrite`] trait so that the same code path can
//! either grow a heap-allocated `Vec<u8>` or fill a fixed-capacity [`BufferMut`] that wraps a
//! caller-owned slice.

#![forbid(unsafe_code)]

/// A sink that packet encoders append bytes to.
///
/// Implementors must allow already-written bytes to be revisited through
/// [`as_mut_slice()`](BufferWrite::as_mut_slice) so that length and checksum fields can be
/// backfilled once the rest of a packet has been written.
pub trait BufferWrite {
    /// Appends the provided bytes to the end of the buffer.
    fn append(&mut self, bytes: &[u8]);

    /// Appends a single byte to the end of the buffer.
    #[inline]
    fn push(&mut self, byte: u8) {
        self.append(&[byte]);
    }

    /// Appends `count` zero bytes to the end of the buffer.
    #[inline]
    fn append_zeros(&mut self, count: usize) {
        for _ in 0..count {
            self.push(0);
        }
    }

    /// The number of bytes written to the buffer so far.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes written to the buffer so far.
    fn as_mut_slice(&mut self) -> &mut [u8];
}

impl BufferWrite for Vec<u8> {
    #[inline]
    fn append(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        Vec::push(self, byte);
    }

    #[inline]
    fn append_zeros(&mut self, count: usize) {
        self.resize(Vec::len(self) + count, 0);
    }

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        Vec::as_mut_slice(self)
    }
}

/// A bounded write buffer over a caller-supplied mutable slice.
#[derive(Debug)]
pub struct BufferMut<'a> {
    buf: &'a mut [u8],
    buf_len: usize,
}

impl<'a> BufferMut<'a> {
    #[inline]
    pub fn new(slice: &'a mut [u8]) -> Self {
        Self {
            buf: slice,
            buf_len: 0,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.buf_len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf[..self.buf_len]
    }

    /// Appends the provided bytes to the buffer, panicking if insufficient space is available in
    /// the buffer.
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf[self.buf_len..self.buf_len + bytes.len()].copy_from_slice(bytes);
        self.buf_len += bytes.len();
    }

    /// Appends the provided bytes to the buffer, returning `error` if insufficient space is
    /// available in the buffer.
    #[inline]
    pub fn append_or<T>(&mut self, bytes: &[u8], error: T) -> Result<(), T> {
        let buf_slice = self
            .buf
            .get_mut(self.buf_len..self.buf_len + bytes.len())
            .ok_or(error)?;
        buf_slice.copy_from_slice(bytes);
        self.buf_len += bytes.len();
        Ok(())
    }

    /// Truncates the buffer to the specified position.
    pub fn truncate(&mut self, pos: usize) {
        assert!(self.buf_len >= pos);
        self.buf_len = pos;
    }

    /// Consumes the buffer, returning the written portion of the underlying slice.
    #[inline]
    pub fn into_mut_slice(self) -> &'a mut [u8] {
        &mut self.buf[..self.buf_len]
    }

    /// The length of the written portion of the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf_len == 0
    }

    /// The number of unused bytes in the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.buf_len
    }
}

impl BufferWrite for BufferMut<'_> {
    #[inline]
    fn append(&mut self, bytes: &[u8]) {
        BufferMut::append(self, bytes);
    }

    #[inline]
    fn len(&self) -> usize {
        self.buf_len
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        BufferMut::as_mut_slice(self)
    }
}
