// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The Internet Protocol version 4 (IPv4) datagram.

mod options;

pub use options::*;

use std::borrow::Cow;
use std::net::Ipv4Addr;

use bitflags::bitflags;
use sigpkts_common::BufferWrite;

use crate::checksum;
use crate::error::{LengthField, TypeField, ValidationError};
use crate::layers::icmp::Icmp;
use crate::layers::sctp::Sctp;
use crate::layers::traits::*;
use crate::utils;

/// Internet Control Message Protocol (see RFC 792)
pub const IP_PROTOCOL_ICMP: u8 = 1;
/// Transmission Control Protocol (see RFC 9293)
pub const IP_PROTOCOL_TCP: u8 = 6;
/// User Datagram Protocol (see RFC 768)
pub const IP_PROTOCOL_UDP: u8 = 17;
/// Stream Control Transmission Protocol (see RFC 9260)
pub const IP_PROTOCOL_SCTP: u8 = 132;

const IPV4_VERSION: u8 = 4;
const IPV4_HEADER_MIN_LEN: usize = 20;
const IPV4_CHECKSUM_OFFSET: usize = 10;

/// Explicit Congestion Notification (ECN) values available in an Ipv4 packet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Ecn {
    /// Non ECN-Capable Transport
    #[default]
    NonEct = 0b00,
    /// ECN Capable Transport, ECT(1)
    Ect1 = 0b01,
    /// ECN Capable Transport, ECT(0)
    Ect0 = 0b10,
    /// Congestion Experienced
    CongestionExperienced = 0b11,
}

impl From<u8> for Ecn {
    /// Converts the least significant two bits of the given byte into Explicit Congestion
    /// Notification flags.
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Ecn::NonEct,
            0b01 => Ecn::Ect1,
            0b10 => Ecn::Ect0,
            _ => Ecn::CongestionExperienced,
        }
    }
}

bitflags! {
    /// Flags available in an IPv4 packet.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Ipv4Flags: u8 {
        const RESERVED = 0b100;
        const DONT_FRAGMENT = 0b010;
        const MORE_FRAGMENTS = 0b001;
    }
}

/// An IPv4 (Internet Protocol version 4) datagram.
///
/// The header checksum, Internet Header Length and Total Length are derived from the other
/// fields whenever they are needed, so they can never disagree with the datagram's contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ipv4<'a> {
    dscp: u8,
    ecn: Ecn,
    identifier: u16,
    flags: Ipv4Flags,
    frag_offset: u16,
    ttl: u8,
    protocol: u8,
    saddr: Ipv4Addr,
    daddr: Ipv4Addr,
    options: Vec<Ipv4Option>,
    payload: Cow<'a, [u8]>,
}

impl<'a> Ipv4<'a> {
    #[inline]
    pub fn builder() -> Ipv4Builder<'a> {
        Ipv4Builder::default()
    }

    #[inline]
    pub fn version(&self) -> u8 {
        IPV4_VERSION
    }

    /// The Internet Header Length, in 32-bit words.
    #[inline]
    pub fn ihl(&self) -> u8 {
        (self.header_len() / 4) as u8
    }

    /// The length of the header (including options and their padding) in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        IPV4_HEADER_MIN_LEN
            + utils::padded_length::<4>(self.options.iter().map(Ipv4Option::len).sum())
    }

    /// The Differentiated Services Code Point.
    #[inline]
    pub fn dscp(&self) -> u8 {
        self.dscp
    }

    #[inline]
    pub fn ecn(&self) -> Ecn {
        self.ecn
    }

    /// The Type of Service octet (DSCP and ECN combined).
    #[inline]
    pub fn tos(&self) -> u8 {
        (self.dscp << 2) | self.ecn as u8
    }

    #[inline]
    pub fn total_length(&self) -> u16 {
        (self.header_len() + self.payload.len()) as u16
    }

    #[inline]
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    #[inline]
    pub fn flags(&self) -> Ipv4Flags {
        self.flags
    }

    /// The fragment offset, in units of 8 bytes.
    #[inline]
    pub fn frag_offset(&self) -> u16 {
        self.frag_offset
    }

    #[inline]
    pub fn ttl(&self) -> u8 {
        self.ttl
    }

    #[inline]
    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    /// The header checksum that would be written on encode.
    pub fn chksum(&self) -> u16 {
        let mut header = Vec::with_capacity(self.header_len());
        self.header_to_bytes(&mut header, 0);
        checksum::ip_checksum(&header)
    }

    #[inline]
    pub fn saddr(&self) -> Ipv4Addr {
        self.saddr
    }

    #[inline]
    pub fn daddr(&self) -> Ipv4Addr {
        self.daddr
    }

    #[inline]
    pub fn options(&self) -> &[Ipv4Option] {
        &self.options
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decodes the payload as an ICMP message.
    pub fn icmp(&self) -> Result<Icmp<'_>, ValidationError> {
        self.expect_protocol(IP_PROTOCOL_ICMP)?;
        Icmp::from_bytes(&self.payload)
    }

    /// Decodes the payload as an SCTP packet.
    pub fn sctp(&self) -> Result<Sctp<'_>, ValidationError> {
        self.expect_protocol(IP_PROTOCOL_SCTP)?;
        Sctp::from_bytes(&self.payload)
    }

    fn expect_protocol(&self, protocol: u8) -> Result<(), ValidationError> {
        if self.protocol == protocol {
            Ok(())
        } else {
            Err(ValidationError::TypeInvalid {
                field: TypeField::IpProtocol,
                value: self.protocol as u16,
            })
        }
    }

    fn header_to_bytes<B: BufferWrite>(&self, bytes: &mut B, chksum: u16) {
        let start = bytes.len();
        bytes.push((IPV4_VERSION << 4) | self.ihl());
        bytes.push(self.tos());
        bytes.append(&self.total_length().to_be_bytes());
        bytes.append(&self.identifier.to_be_bytes());
        bytes.append(&(((self.flags.bits() as u16) << 13) | self.frag_offset).to_be_bytes());
        bytes.push(self.ttl);
        bytes.push(self.protocol);
        bytes.append(&chksum.to_be_bytes());
        bytes.append(&self.saddr.octets());
        bytes.append(&self.daddr.octets());
        for option in &self.options {
            option.to_bytes_extended(bytes);
        }
        utils::pad_to_4(bytes, start);
    }

    fn decode(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        let Some(&version_ihl) = bytes.first() else {
            return Err(Self::incomplete(IPV4_HEADER_MIN_LEN, 0));
        };

        let header_len = (version_ihl & 0x0F) as usize * 4;
        if header_len < IPV4_HEADER_MIN_LEN {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Header,
                length: header_len,
            });
        }

        if bytes.len() < header_len {
            return Err(Self::incomplete(header_len, bytes.len()));
        }

        let header = &bytes[..header_len];
        let received = utils::be_u16(header, IPV4_CHECKSUM_OFFSET);
        let expected = checksum::ip_checksum_without_field(header, IPV4_CHECKSUM_OFFSET);
        if received != expected {
            tracing::debug!(received, expected, "IPv4 header checksum mismatch");
            return Err(ValidationError::ChecksumInvalid {
                layer: "IPv4",
                received: received as u32,
                expected: expected as u32,
            });
        }

        let version = version_ihl >> 4;
        if version != IPV4_VERSION {
            return Err(ValidationError::TypeInvalid {
                field: TypeField::IpVersion,
                value: version as u16,
            });
        }

        let total_length = utils::be_u16(header, 2) as usize;
        if total_length < header_len {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4TotalLength,
                length: total_length,
            });
        }

        if total_length > bytes.len() {
            return Err(Self::incomplete(total_length, bytes.len()));
        }

        let options = options::parse_options(&header[IPV4_HEADER_MIN_LEN..], header_len)?;
        let flags_frag = utils::be_u16(header, 6);

        Ok(Self {
            dscp: header[1] >> 2,
            ecn: Ecn::from(header[1]),
            identifier: utils::be_u16(header, 4),
            flags: Ipv4Flags::from_bits_retain((flags_frag >> 13) as u8),
            frag_offset: flags_frag & 0x1FFF,
            ttl: header[8],
            protocol: header[9],
            saddr: Ipv4Addr::from(utils::be_u32(header, 12)),
            daddr: Ipv4Addr::from(utils::be_u32(header, 16)),
            options,
            // Bytes beyond Total Length belong to the link layer.
            payload: Cow::Borrowed(&bytes[header_len..total_length]),
        })
    }

    #[inline]
    fn incomplete(required: usize, available: usize) -> ValidationError {
        ValidationError::HeaderIncomplete {
            layer: "IPv4",
            required,
            available,
        }
    }
}

impl<'a> FromBytes<'a> for Ipv4<'a> {
    fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        Self::decode(bytes).map_err(|e| {
            tracing::debug!(error = %e, len = bytes.len(), "failed to decode IPv4 datagram");
            e
        })
    }
}

impl LayerLength for Ipv4<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.header_len() + self.payload.len()
    }
}

impl ToBytes for Ipv4<'_> {
    fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
        let start = bytes.len();
        self.header_to_bytes(bytes, 0);
        let chksum = checksum::ip_checksum(&bytes.as_mut_slice()[start..]);
        utils::backfill_u16(bytes, start + IPV4_CHECKSUM_OFFSET, chksum);
        bytes.append(&self.payload);
    }
}

impl IntoOwned for Ipv4<'_> {
    type Owned = Ipv4<'static>;

    fn into_owned(self) -> Self::Owned {
        Ipv4 {
            payload: Cow::Owned(self.payload.into_owned()),
            dscp: self.dscp,
            ecn: self.ecn,
            identifier: self.identifier,
            flags: self.flags,
            frag_offset: self.frag_offset,
            ttl: self.ttl,
            protocol: self.protocol,
            saddr: self.saddr,
            daddr: self.daddr,
            options: self.options,
        }
    }
}

impl Framed for Ipv4<'_> {
    const PREFIX_LEN: usize = 4;

    fn frame_len(prefix: &[u8]) -> Result<usize, ValidationError> {
        let Some(&version_ihl) = prefix.first() else {
            return Err(Self::incomplete(Self::PREFIX_LEN, 0));
        };

        if version_ihl >> 4 != IPV4_VERSION {
            return Err(ValidationError::TypeInvalid {
                field: TypeField::IpVersion,
                value: (version_ihl >> 4) as u16,
            });
        }

        let Some(total_length) = utils::get_array(prefix, 2).map(|&a| u16::from_be_bytes(a))
        else {
            return Err(Self::incomplete(Self::PREFIX_LEN, prefix.len()));
        };

        let total_length = total_length as usize;
        if total_length < IPV4_HEADER_MIN_LEN {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4TotalLength,
                length: total_length,
            });
        }

        Ok(total_length)
    }
}

impl_decode_owned!(Ipv4);

/// A validating constructor for [`Ipv4`] datagrams.
#[derive(Clone, Debug)]
pub struct Ipv4Builder<'a> {
    dscp: u8,
    ecn: Ecn,
    identifier: u16,
    flags: Ipv4Flags,
    frag_offset: u16,
    ttl: u8,
    protocol: u8,
    saddr: Ipv4Addr,
    daddr: Ipv4Addr,
    options: Vec<Ipv4Option>,
    payload: Cow<'a, [u8]>,
}

impl Default for Ipv4Builder<'_> {
    fn default() -> Self {
        Self {
            dscp: 0,
            ecn: Ecn::NonEct,
            identifier: 0,
            flags: Ipv4Flags::empty(),
            frag_offset: 0,
            ttl: 64,
            protocol: 0,
            saddr: Ipv4Addr::UNSPECIFIED,
            daddr: Ipv4Addr::UNSPECIFIED,
            options: Vec::new(),
            payload: Cow::Borrowed(&[]),
        }
    }
}

impl<'a> Ipv4Builder<'a> {
    #[inline]
    pub fn dscp(mut self, dscp: u8) -> Self {
        self.dscp = dscp;
        self
    }

    #[inline]
    pub fn ecn(mut self, ecn: Ecn) -> Self {
        self.ecn = ecn;
        self
    }

    #[inline]
    pub fn identifier(mut self, identifier: u16) -> Self {
        self.identifier = identifier;
        self
    }

    #[inline]
    pub fn flags(mut self, flags: Ipv4Flags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn frag_offset(mut self, frag_offset: u16) -> Self {
        self.frag_offset = frag_offset;
        self
    }

    #[inline]
    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    #[inline]
    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    #[inline]
    pub fn saddr(mut self, saddr: Ipv4Addr) -> Self {
        self.saddr = saddr;
        self
    }

    #[inline]
    pub fn daddr(mut self, daddr: Ipv4Addr) -> Self {
        self.daddr = daddr;
        self
    }

    #[inline]
    pub fn option(mut self, option: Ipv4Option) -> Self {
        self.options.push(option);
        self
    }

    #[inline]
    pub fn payload(mut self, payload: impl Into<Cow<'a, [u8]>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Checks every field against the limits of its wire representation.
    pub fn build(self) -> Result<Ipv4<'a>, ValidationError> {
        if self.dscp > 0x3F {
            return Err(ValidationError::ValueOutOfRange {
                field: "IPv4 DSCP",
                value: self.dscp as u32,
            });
        }

        if self.frag_offset > 0x1FFF {
            return Err(ValidationError::ValueOutOfRange {
                field: "IPv4 fragment offset",
                value: self.frag_offset as u32,
            });
        }

        options::validate_options(&self.options)?;

        let datagram = Ipv4 {
            dscp: self.dscp,
            ecn: self.ecn,
            identifier: self.identifier,
            flags: self.flags,
            frag_offset: self.frag_offset,
            ttl: self.ttl,
            protocol: self.protocol,
            saddr: self.saddr,
            daddr: self.daddr,
            options: self.options,
            payload: self.payload,
        };

        if datagram.len() > u16::MAX as usize {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4TotalLength,
                length: datagram.len(),
            });
        }

        Ok(datagram)
    }
}
