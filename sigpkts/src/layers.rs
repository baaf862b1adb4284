// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The protocol layers implemented by this library.
//!
//! Tightly related wire entities share a module: IPv4 and its options live in [`ip`], ICMP
//! messages in [`icmp`], and the SCTP common header along with its chunks, chunk parameters and
//! error causes in [`sctp`]. The [`traits`] module holds the encoding and decoding traits every
//! entity implements, and [`tlv`] the padded Type-Length-Value framing SCTP builds on.

pub mod icmp;
pub mod ip;
pub mod sctp;
pub mod tlv;
pub mod traits;
