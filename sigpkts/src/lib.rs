// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Wire-exact encoding and decoding of IPv4, ICMP and SCTP packets.
//!
//! Every layer is decoded with [`FromBytes::from_bytes()`](layers::traits::FromBytes), which
//! validates checksums, length fields and type tags before returning a value that borrows its
//! variable-length payloads from the input. Encoding with
//! [`ToBytes::to_bytes()`](layers::traits::ToBytes) derives every length, padding and checksum
//! field from the value itself, so a decoded packet re-encodes to the same bytes.
//!
//! ```
//! use sigpkts::prelude::*;
//! use sigpkts::layers::sctp::{Chunk, CookieAckChunk, Sctp};
//!
//! let packet = Sctp::new(5000, 5000, 0x0102_0304, vec![Chunk::CookieAck(CookieAckChunk::new())]);
//! let bytes = packet.to_bytes();
//! assert_eq!(Sctp::from_bytes(&bytes), Ok(packet));
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::len_without_is_empty)]

pub mod checksum;
pub mod error;
pub mod layers;
pub mod prelude;
pub mod utils;
