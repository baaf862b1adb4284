// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Checksum algorithms used by the layer codecs.
//!
//! Validation is always done by recomputing the checksum and comparing it against the value
//! found on the wire.

use crate::utils;

/// Offset of the CRC32c field within the SCTP common header.
pub(crate) const SCTP_CHECKSUM_OFFSET: usize = 8;

/// Computes the Internet checksum (RFC 1071) over `bytes`.
///
/// All 16-bit big-endian words are summed with end-around carry (an odd trailing byte is
/// zero-padded), and the one's complement of the sum is returned. Used for both the IPv4 header
/// checksum and the ICMP message checksum.
#[inline]
pub fn ip_checksum(bytes: &[u8]) -> u16 {
    !utils::ones_complement_16bit(bytes)
}

/// Computes the Internet checksum over `bytes` as though the 16-bit field at `field_offset`
/// were zero. `field_offset` must be even.
pub(crate) fn ip_checksum_without_field(bytes: &[u8], field_offset: usize) -> u16 {
    debug_assert!(field_offset % 2 == 0);
    let head = bytes.get(..field_offset).unwrap_or(bytes);
    let tail = bytes.get(field_offset + 2..).unwrap_or(&[]);
    !utils::ones_complement_add(
        utils::ones_complement_16bit(head),
        utils::ones_complement_16bit(tail),
    )
}

/// Computes the CRC-32C (Castagnoli) checksum over `bytes`.
#[inline]
pub fn crc32c(bytes: &[u8]) -> u32 {
    ::crc32c::crc32c(bytes)
}

/// Computes the CRC-32C of an SCTP packet with its checksum field treated as zero.
///
/// The result is placed on the wire in little-endian byte order.
pub fn sctp_crc32c(packet: &[u8]) -> u32 {
    let head = packet.get(..SCTP_CHECKSUM_OFFSET).unwrap_or(packet);
    let tail = packet.get(SCTP_CHECKSUM_OFFSET + 4..).unwrap_or(&[]);
    let crc = ::crc32c::crc32c(head);
    let crc = ::crc32c::crc32c_append(crc, &[0; 4]);
    ::crc32c::crc32c_append(crc, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_header_checksum() {
        let header = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        assert_eq!(ip_checksum(&header), 0xb861);

        let mut filled = header;
        filled[10..12].copy_from_slice(&0xb861u16.to_be_bytes());
        assert_eq!(ip_checksum_without_field(&filled, 10), 0xb861);
        // A correct checksum folds the whole header to zero.
        assert_eq!(ip_checksum(&filled), 0);
    }

    #[test]
    fn crc32c_check_value() {
        assert_eq!(crc32c(b"123456789"), 0xe306_9283);
    }

    #[test]
    fn sctp_crc_ignores_checksum_field() {
        let mut packet = [0u8; 16];
        packet[0] = 0x13;
        packet[12..].copy_from_slice(&[11, 0, 0, 4]);
        let crc = sctp_crc32c(&packet);
        assert_eq!(crc, crc32c(&packet));

        packet[8..12].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(sctp_crc32c(&packet), crc);
    }
}
