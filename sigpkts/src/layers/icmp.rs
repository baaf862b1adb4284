// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Internet Control Message Protocol (ICMP) messages, per RFC 792.

use std::borrow::Cow;
use std::net::Ipv4Addr;

use sigpkts_common::BufferWrite;

use crate::checksum;
use crate::error::{LengthField, TypeField, ValidationError};
use crate::layers::traits::*;
use crate::utils;

pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_DEST_UNREACHABLE: u8 = 3;
pub const ICMP_TYPE_SOURCE_QUENCH: u8 = 4;
pub const ICMP_TYPE_REDIRECT: u8 = 5;
pub const ICMP_TYPE_ECHO: u8 = 8;
pub const ICMP_TYPE_TIME_EXCEEDED: u8 = 11;
pub const ICMP_TYPE_PARAMETER_PROBLEM: u8 = 12;
pub const ICMP_TYPE_TIMESTAMP: u8 = 13;
pub const ICMP_TYPE_TIMESTAMP_REPLY: u8 = 14;
pub const ICMP_TYPE_INFO_REQUEST: u8 = 15;
pub const ICMP_TYPE_INFO_REPLY: u8 = 16;

const ICMP_HEADER_LEN: usize = 8;
const ICMP_TIMESTAMP_LEN: usize = 20;
const ICMP_CHECKSUM_OFFSET: usize = 2;

macro_rules! icmp_codes {
    (
        $(#[$meta:meta])*
        $name:ident for $msg_type:path {
            $($(#[$vmeta:meta])* $variant:ident = $val:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $val,)+
        }

        impl TryFrom<u8> for $name {
            type Error = ValidationError;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $($val => Ok(Self::$variant),)+
                    c => Err(ValidationError::TypeInvalid {
                        field: TypeField::IcmpCode { message_type: $msg_type },
                        value: c as u16,
                    }),
                }
            }
        }
    };
}

icmp_codes! {
    /// Destination Unreachable codes (RFC 792, RFC 1122, RFC 1812).
    UnreachableCode for ICMP_TYPE_DEST_UNREACHABLE {
        NetUnreachable = 0,
        HostUnreachable = 1,
        ProtocolUnreachable = 2,
        PortUnreachable = 3,
        /// Fragmentation needed and DF set
        FragmentationNeeded = 4,
        SourceRouteFailed = 5,
        DestinationNetworkUnknown = 6,
        DestinationHostUnknown = 7,
        SourceHostIsolated = 8,
        NetworkProhibited = 9,
        HostProhibited = 10,
        NetworkUnreachableForTos = 11,
        HostUnreachableForTos = 12,
        CommunicationProhibited = 13,
        HostPrecedenceViolation = 14,
        PrecedenceCutoff = 15,
    }
}

icmp_codes! {
    RedirectCode for ICMP_TYPE_REDIRECT {
        Network = 0,
        Host = 1,
        TosNetwork = 2,
        TosHost = 3,
    }
}

icmp_codes! {
    TimeExceededCode for ICMP_TYPE_TIME_EXCEEDED {
        TtlExceeded = 0,
        FragmentReassembly = 1,
    }
}

icmp_codes! {
    ParameterProblemCode for ICMP_TYPE_PARAMETER_PROBLEM {
        /// The pointer indicates the octet where an error was detected.
        PointerIndicatesError = 0,
        MissingRequiredOption = 1,
        BadLength = 2,
    }
}

/// Accessors for the four header bytes that follow the checksum of an error message.
macro_rules! rest_of_header {
    ($($name:ident),+) => {
        $(
            impl $name<'_> {
                /// Header bytes 4 through 7, as they appear on the wire.
                #[inline]
                pub fn rest_of_header(&self) -> [u8; 4] {
                    self.rest_of_header
                }

                /// Replaces header bytes 4 through 7, including any fields decoded from them.
                #[inline]
                pub fn with_rest_of_header(mut self, rest_of_header: [u8; 4]) -> Self {
                    self.rest_of_header = rest_of_header;
                    self
                }
            }
        )+
    };
}

/// Accessors for the RFC 4884 Length octet (header byte 5) of an error message.
macro_rules! extension_length {
    ($($name:ident),+) => {
        $(
            impl $name<'_> {
                /// The length of the original datagram excerpt in 32-bit words, or 0 if the
                /// message carries no extension structure (RFC 4884).
                #[inline]
                pub fn length(&self) -> u8 {
                    self.rest_of_header[1]
                }

                #[inline]
                pub fn with_length(mut self, words: u8) -> Self {
                    self.rest_of_header[1] = words;
                    self
                }
            }
        )+
    };
}

/// An Echo or Echo Reply message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Echo<'a> {
    is_reply: bool,
    identifier: u16,
    sequence: u16,
    data: Cow<'a, [u8]>,
}

impl<'a> Echo<'a> {
    pub fn new(
        is_reply: bool,
        identifier: u16,
        sequence: u16,
        data: impl Into<Cow<'a, [u8]>>,
    ) -> Self {
        Self {
            is_reply,
            identifier,
            sequence,
            data: data.into(),
        }
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.is_reply
    }

    #[inline]
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    #[inline]
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// An Information Request or Information Reply message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Information {
    is_reply: bool,
    identifier: u16,
    sequence: u16,
}

impl Information {
    pub fn new(is_reply: bool, identifier: u16, sequence: u16) -> Self {
        Self {
            is_reply,
            identifier,
            sequence,
        }
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.is_reply
    }

    #[inline]
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    #[inline]
    pub fn sequence(&self) -> u16 {
        self.sequence
    }
}

/// A Destination Unreachable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationUnreachable<'a> {
    code: UnreachableCode,
    rest_of_header: [u8; 4],
    data: Cow<'a, [u8]>,
}

impl<'a> DestinationUnreachable<'a> {
    pub fn new(code: UnreachableCode, data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            code,
            rest_of_header: [0; 4],
            data: data.into(),
        }
    }

    /// A "fragmentation needed" message advertising the MTU of the next-hop network
    /// (RFC 1191).
    pub fn fragmentation_needed(next_hop_mtu: u16, data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::new(UnreachableCode::FragmentationNeeded, data).with_next_hop_mtu(next_hop_mtu)
    }

    #[inline]
    pub fn code(&self) -> UnreachableCode {
        self.code
    }

    /// The Next-Hop MTU field (header bytes 6 and 7).
    ///
    /// RFC 1191 only assigns it for [`UnreachableCode::FragmentationNeeded`], but it is kept
    /// as received for every code.
    #[inline]
    pub fn next_hop_mtu(&self) -> u16 {
        u16::from_be_bytes([self.rest_of_header[2], self.rest_of_header[3]])
    }

    #[inline]
    pub fn with_next_hop_mtu(mut self, next_hop_mtu: u16) -> Self {
        self.rest_of_header[2..].copy_from_slice(&next_hop_mtu.to_be_bytes());
        self
    }

    /// The internet header and leading payload bytes of the datagram that triggered the message.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A Parameter Problem message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterProblem<'a> {
    code: ParameterProblemCode,
    rest_of_header: [u8; 4],
    data: Cow<'a, [u8]>,
}

impl<'a> ParameterProblem<'a> {
    pub fn new(code: ParameterProblemCode, pointer: u8, data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            code,
            rest_of_header: [pointer, 0, 0, 0],
            data: data.into(),
        }
    }

    #[inline]
    pub fn code(&self) -> ParameterProblemCode {
        self.code
    }

    /// The octet of the original datagram's header where the error was detected.
    #[inline]
    pub fn pointer(&self) -> u8 {
        self.rest_of_header[0]
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A Redirect message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect<'a> {
    code: RedirectCode,
    gateway: Ipv4Addr,
    data: Cow<'a, [u8]>,
}

impl<'a> Redirect<'a> {
    pub fn new(code: RedirectCode, gateway: Ipv4Addr, data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            code,
            gateway,
            data: data.into(),
        }
    }

    #[inline]
    pub fn code(&self) -> RedirectCode {
        self.code
    }

    #[inline]
    pub fn gateway(&self) -> Ipv4Addr {
        self.gateway
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A Source Quench message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceQuench<'a> {
    rest_of_header: [u8; 4],
    data: Cow<'a, [u8]>,
}

impl<'a> SourceQuench<'a> {
    pub fn new(data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            rest_of_header: [0; 4],
            data: data.into(),
        }
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A Time Exceeded message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeExceeded<'a> {
    code: TimeExceededCode,
    rest_of_header: [u8; 4],
    data: Cow<'a, [u8]>,
}

impl<'a> TimeExceeded<'a> {
    pub fn new(code: TimeExceededCode, data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            code,
            rest_of_header: [0; 4],
            data: data.into(),
        }
    }

    #[inline]
    pub fn code(&self) -> TimeExceededCode {
        self.code
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

rest_of_header!(DestinationUnreachable, ParameterProblem, SourceQuench, TimeExceeded);
extension_length!(DestinationUnreachable, ParameterProblem, TimeExceeded);

/// A Timestamp or Timestamp Reply message.
///
/// Timestamps are milliseconds since midnight UT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp {
    is_reply: bool,
    identifier: u16,
    sequence: u16,
    originate: u32,
    receive: u32,
    transmit: u32,
}

impl Timestamp {
    pub fn new(
        is_reply: bool,
        identifier: u16,
        sequence: u16,
        originate: u32,
        receive: u32,
        transmit: u32,
    ) -> Self {
        Self {
            is_reply,
            identifier,
            sequence,
            originate,
            receive,
            transmit,
        }
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.is_reply
    }

    #[inline]
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    #[inline]
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    #[inline]
    pub fn originate(&self) -> u32 {
        self.originate
    }

    #[inline]
    pub fn receive(&self) -> u32 {
        self.receive
    }

    #[inline]
    pub fn transmit(&self) -> u32 {
        self.transmit
    }
}

/// An ICMP message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icmp<'a> {
    Echo(Echo<'a>),
    Information(Information),
    DestinationUnreachable(DestinationUnreachable<'a>),
    ParameterProblem(ParameterProblem<'a>),
    Redirect(Redirect<'a>),
    SourceQuench(SourceQuench<'a>),
    TimeExceeded(TimeExceeded<'a>),
    Timestamp(Timestamp),
}

impl<'a> Icmp<'a> {
    /// The Type field of the message.
    pub fn message_type(&self) -> u8 {
        match self {
            Self::Echo(e) if e.is_reply => ICMP_TYPE_ECHO_REPLY,
            Self::Echo(_) => ICMP_TYPE_ECHO,
            Self::Information(i) if i.is_reply => ICMP_TYPE_INFO_REPLY,
            Self::Information(_) => ICMP_TYPE_INFO_REQUEST,
            Self::DestinationUnreachable(_) => ICMP_TYPE_DEST_UNREACHABLE,
            Self::ParameterProblem(_) => ICMP_TYPE_PARAMETER_PROBLEM,
            Self::Redirect(_) => ICMP_TYPE_REDIRECT,
            Self::SourceQuench(_) => ICMP_TYPE_SOURCE_QUENCH,
            Self::TimeExceeded(_) => ICMP_TYPE_TIME_EXCEEDED,
            Self::Timestamp(t) if t.is_reply => ICMP_TYPE_TIMESTAMP_REPLY,
            Self::Timestamp(_) => ICMP_TYPE_TIMESTAMP,
        }
    }

    /// The Code field of the message.
    pub fn code(&self) -> u8 {
        match self {
            Self::DestinationUnreachable(d) => d.code as u8,
            Self::ParameterProblem(p) => p.code as u8,
            Self::Redirect(r) => r.code as u8,
            Self::TimeExceeded(t) => t.code as u8,
            _ => 0,
        }
    }

    /// The checksum that would be written on encode.
    pub fn chksum(&self) -> u16 {
        let mut bytes = Vec::with_capacity(self.len());
        self.write_unchecksummed(&mut bytes);
        checksum::ip_checksum(&bytes)
    }

    fn data(&self) -> &[u8] {
        match self {
            Self::Echo(e) => &e.data,
            Self::DestinationUnreachable(d) => &d.data,
            Self::ParameterProblem(p) => &p.data,
            Self::Redirect(r) => &r.data,
            Self::SourceQuench(s) => &s.data,
            Self::TimeExceeded(t) => &t.data,
            Self::Information(_) | Self::Timestamp(_) => &[],
        }
    }

    fn write_unchecksummed<B: BufferWrite>(&self, bytes: &mut B) {
        bytes.push(self.message_type());
        bytes.push(self.code());
        bytes.append(&[0, 0]);
        match self {
            Self::Echo(Echo {
                identifier,
                sequence,
                ..
            })
            | Self::Information(Information {
                identifier,
                sequence,
                ..
            }) => {
                bytes.append(&identifier.to_be_bytes());
                bytes.append(&sequence.to_be_bytes());
            }
            Self::Timestamp(t) => {
                bytes.append(&t.identifier.to_be_bytes());
                bytes.append(&t.sequence.to_be_bytes());
                bytes.append(&t.originate.to_be_bytes());
                bytes.append(&t.receive.to_be_bytes());
                bytes.append(&t.transmit.to_be_bytes());
            }
            Self::DestinationUnreachable(d) => bytes.append(&d.rest_of_header),
            Self::ParameterProblem(p) => bytes.append(&p.rest_of_header),
            Self::Redirect(r) => bytes.append(&r.gateway.octets()),
            Self::SourceQuench(s) => bytes.append(&s.rest_of_header),
            Self::TimeExceeded(t) => bytes.append(&t.rest_of_header),
        }
        bytes.append(self.data());
    }

    fn decode(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        if bytes.len() < ICMP_HEADER_LEN {
            return Err(ValidationError::HeaderIncomplete {
                layer: "ICMP",
                required: ICMP_HEADER_LEN,
                available: bytes.len(),
            });
        }

        let received = utils::be_u16(bytes, ICMP_CHECKSUM_OFFSET);
        let expected = checksum::ip_checksum_without_field(bytes, ICMP_CHECKSUM_OFFSET);
        if received != expected {
            tracing::debug!(received, expected, "ICMP checksum mismatch");
            return Err(ValidationError::ChecksumInvalid {
                layer: "ICMP",
                received: received as u32,
                expected: expected as u32,
            });
        }

        let message_type = bytes[0];
        let code = bytes[1];
        let identifier = utils::be_u16(bytes, 4);
        let sequence = utils::be_u16(bytes, 6);
        let rest_of_header = utils::to_array::<4>(bytes, 4).unwrap_or_default();
        let data = Cow::Borrowed(&bytes[ICMP_HEADER_LEN..]);

        let require_code_zero = || {
            if code == 0 {
                Ok(())
            } else {
                Err(ValidationError::TypeInvalid {
                    field: TypeField::IcmpCode { message_type },
                    value: code as u16,
                })
            }
        };

        let exact_len =
            |len: usize| utils::exact_len(bytes, len, LengthField::IcmpMessage, bytes.len());

        Ok(match message_type {
            ICMP_TYPE_ECHO | ICMP_TYPE_ECHO_REPLY => {
                require_code_zero()?;
                Self::Echo(Echo {
                    is_reply: message_type == ICMP_TYPE_ECHO_REPLY,
                    identifier,
                    sequence,
                    data,
                })
            }
            ICMP_TYPE_INFO_REQUEST | ICMP_TYPE_INFO_REPLY => {
                require_code_zero()?;
                exact_len(ICMP_HEADER_LEN)?;
                Self::Information(Information {
                    is_reply: message_type == ICMP_TYPE_INFO_REPLY,
                    identifier,
                    sequence,
                })
            }
            ICMP_TYPE_TIMESTAMP | ICMP_TYPE_TIMESTAMP_REPLY => {
                require_code_zero()?;
                exact_len(ICMP_TIMESTAMP_LEN)?;
                Self::Timestamp(Timestamp {
                    is_reply: message_type == ICMP_TYPE_TIMESTAMP_REPLY,
                    identifier,
                    sequence,
                    originate: utils::be_u32(bytes, 8),
                    receive: utils::be_u32(bytes, 12),
                    transmit: utils::be_u32(bytes, 16),
                })
            }
            ICMP_TYPE_DEST_UNREACHABLE => Self::DestinationUnreachable(DestinationUnreachable {
                code: UnreachableCode::try_from(code)?,
                rest_of_header,
                data,
            }),
            ICMP_TYPE_PARAMETER_PROBLEM => Self::ParameterProblem(ParameterProblem {
                code: ParameterProblemCode::try_from(code)?,
                rest_of_header,
                data,
            }),
            ICMP_TYPE_REDIRECT => Self::Redirect(Redirect {
                code: RedirectCode::try_from(code)?,
                gateway: Ipv4Addr::from(utils::be_u32(bytes, 4)),
                data,
            }),
            ICMP_TYPE_SOURCE_QUENCH => {
                require_code_zero()?;
                Self::SourceQuench(SourceQuench {
                    rest_of_header,
                    data,
                })
            }
            ICMP_TYPE_TIME_EXCEEDED => Self::TimeExceeded(TimeExceeded {
                code: TimeExceededCode::try_from(code)?,
                rest_of_header,
                data,
            }),
            t => {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::IcmpType,
                    value: t as u16,
                })
            }
        })
    }
}

impl<'a> FromBytes<'a> for Icmp<'a> {
    fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        Self::decode(bytes).map_err(|e| {
            tracing::debug!(error = %e, len = bytes.len(), "failed to decode ICMP message");
            e
        })
    }
}

impl LayerLength for Icmp<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Timestamp(_) => ICMP_TIMESTAMP_LEN,
            _ => ICMP_HEADER_LEN + self.data().len(),
        }
    }
}

impl ToBytes for Icmp<'_> {
    fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
        let start = bytes.len();
        self.write_unchecksummed(bytes);
        let chksum = checksum::ip_checksum(&bytes.as_mut_slice()[start..]);
        utils::backfill_u16(bytes, start + ICMP_CHECKSUM_OFFSET, chksum);
    }
}

impl IntoOwned for Icmp<'_> {
    type Owned = Icmp<'static>;

    fn into_owned(self) -> Self::Owned {
        fn owned(data: Cow<'_, [u8]>) -> Cow<'static, [u8]> {
            Cow::Owned(data.into_owned())
        }

        match self {
            Self::Echo(e) => Icmp::Echo(Echo {
                is_reply: e.is_reply,
                identifier: e.identifier,
                sequence: e.sequence,
                data: owned(e.data),
            }),
            Self::Information(i) => Icmp::Information(i),
            Self::DestinationUnreachable(d) => Icmp::DestinationUnreachable(DestinationUnreachable {
                code: d.code,
                rest_of_header: d.rest_of_header,
                data: owned(d.data),
            }),
            Self::ParameterProblem(p) => Icmp::ParameterProblem(ParameterProblem {
                code: p.code,
                rest_of_header: p.rest_of_header,
                data: owned(p.data),
            }),
            Self::Redirect(r) => Icmp::Redirect(Redirect {
                code: r.code,
                gateway: r.gateway,
                data: owned(r.data),
            }),
            Self::SourceQuench(s) => Icmp::SourceQuench(SourceQuench {
                rest_of_header: s.rest_of_header,
                data: owned(s.data),
            }),
            Self::TimeExceeded(t) => Icmp::TimeExceeded(TimeExceeded {
                code: t.code,
                rest_of_header: t.rest_of_header,
                data: owned(t.data),
            }),
            Self::Timestamp(t) => Icmp::Timestamp(t),
        }
    }
}

impl_decode_owned!(Icmp);

#[cfg(test)]
mod tests {
    use super::*;

    const ECHO_REQUEST: [u8; 16] = [8, 0, 0xe7, 0xe0, 0, 10, 0, 1, 1, 2, 3, 4, 5, 6, 7, 8];

    #[test]
    fn echo_request() {
        let icmp = Icmp::from_bytes(&ECHO_REQUEST).unwrap();
        assert_eq!(
            icmp,
            Icmp::Echo(Echo::new(false, 10, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]))
        );
        assert_eq!(icmp.chksum(), 0xe7e0);
        assert_eq!(icmp.to_bytes(), ECHO_REQUEST);
    }

    #[test]
    fn echo_reply_flag() {
        let reply = Icmp::Echo(Echo::new(true, 10, 1, &[1u8, 2][..]));
        let bytes = reply.to_bytes();
        assert_eq!(bytes[0], ICMP_TYPE_ECHO_REPLY);
        assert_eq!(Icmp::from_bytes(&bytes).unwrap(), reply);
    }

    #[test]
    fn checksum_sensitivity() {
        for byte in (0..ECHO_REQUEST.len()).filter(|&b| b != 2 && b != 3) {
            for bit in 0..8 {
                let mut corrupt = ECHO_REQUEST;
                corrupt[byte] ^= 1 << bit;
                assert_eq!(
                    Icmp::from_bytes(&corrupt),
                    Err(ValidationError::ChecksumInvalid {
                        layer: "ICMP",
                        received: 0xe7e0,
                        expected: checksum::ip_checksum_without_field(&corrupt, 2) as u32,
                    })
                );
            }
        }
    }

    #[test]
    fn unknown_type() {
        let mut bytes = [42, 0, 0, 0, 0, 0, 0, 0];
        let chksum = checksum::ip_checksum(&bytes);
        bytes[2..4].copy_from_slice(&chksum.to_be_bytes());
        assert_eq!(
            Icmp::from_bytes(&bytes),
            Err(ValidationError::TypeInvalid {
                field: TypeField::IcmpType,
                value: 42
            })
        );
    }

    #[test]
    fn unreachable_code_range() {
        let header = [0x45u8; 28];
        for code in 0..16u8 {
            let msg = Icmp::DestinationUnreachable(DestinationUnreachable::new(
                UnreachableCode::try_from(code).unwrap(),
                &header[..],
            ));
            let bytes = msg.to_bytes();
            assert_eq!(bytes[1], code);
            assert_eq!(Icmp::from_bytes(&bytes).unwrap(), msg);
        }

        let mut bytes = [3, 16, 0, 0, 0, 0, 0, 0];
        let chksum = checksum::ip_checksum(&bytes);
        bytes[2..4].copy_from_slice(&chksum.to_be_bytes());
        assert_eq!(
            Icmp::from_bytes(&bytes),
            Err(ValidationError::TypeInvalid {
                field: TypeField::IcmpCode {
                    message_type: ICMP_TYPE_DEST_UNREACHABLE
                },
                value: 16
            })
        );
    }

    #[test]
    fn fragmentation_needed_carries_mtu() {
        let msg = Icmp::DestinationUnreachable(DestinationUnreachable::fragmentation_needed(
            1400,
            vec![0x45, 0],
        ));
        let bytes = msg.to_bytes();
        assert_eq!(&bytes[4..8], &[0, 0, 0x05, 0x78]);
        let Icmp::DestinationUnreachable(decoded) = Icmp::from_bytes(&bytes).unwrap() else {
            panic!("expected Destination Unreachable");
        };
        assert_eq!(decoded.next_hop_mtu(), 1400);
        assert_eq!(decoded.code(), UnreachableCode::FragmentationNeeded);
    }

    #[test]
    fn next_hop_mtu_on_any_code() {
        let mut bytes = vec![3, 0, 0, 0, 0, 0, 0x05, 0x78, 0x45, 0];
        let chksum = checksum::ip_checksum(&bytes);
        bytes[2..4].copy_from_slice(&chksum.to_be_bytes());

        let built = Icmp::DestinationUnreachable(
            DestinationUnreachable::new(UnreachableCode::NetUnreachable, vec![0x45, 0])
                .with_next_hop_mtu(1400),
        );
        assert_eq!(Icmp::from_bytes(&bytes).unwrap(), built);
        assert_eq!(built.to_bytes(), bytes);
    }

    #[test]
    fn rest_of_header_round_trips() {
        let excerpt = [0x45u8; 32];
        let headers: [(u8, u8, [u8; 4]); 4] = [
            (ICMP_TYPE_TIME_EXCEEDED, 0, [0, 32, 0, 0]),
            (ICMP_TYPE_DEST_UNREACHABLE, 1, [0x11, 8, 0, 0]),
            (ICMP_TYPE_PARAMETER_PROBLEM, 0, [9, 8, 0xab, 0xcd]),
            (ICMP_TYPE_SOURCE_QUENCH, 0, [1, 2, 3, 4]),
        ];

        for (message_type, code, rest) in headers {
            let mut bytes = vec![message_type, code, 0, 0];
            bytes.extend_from_slice(&rest);
            bytes.extend_from_slice(&excerpt);
            let chksum = checksum::ip_checksum(&bytes);
            bytes[2..4].copy_from_slice(&chksum.to_be_bytes());

            let decoded = Icmp::from_bytes(&bytes).unwrap();
            assert_eq!(decoded.to_bytes(), bytes);
            assert_eq!(decoded.chksum(), chksum);
        }

        let built = Icmp::TimeExceeded(
            TimeExceeded::new(TimeExceededCode::TtlExceeded, &excerpt[..]).with_length(32),
        );
        let bytes = built.to_bytes();
        assert_eq!(&bytes[4..8], &[0, 32, 0, 0]);
        let Icmp::TimeExceeded(decoded) = Icmp::from_bytes(&bytes).unwrap() else {
            panic!("expected Time Exceeded");
        };
        assert_eq!(decoded.length(), 32);

        let problem = ParameterProblem::new(ParameterProblemCode::BadLength, 9, &excerpt[..])
            .with_rest_of_header([12, 8, 0, 0]);
        assert_eq!(problem.pointer(), 12);
        assert_eq!(problem.length(), 8);
    }

    #[test]
    fn fixed_size_messages() {
        let ts = Icmp::Timestamp(Timestamp::new(true, 7, 9, 1000, 2000, 3000));
        let bytes = ts.to_bytes();
        assert_eq!(bytes.len(), 20);
        assert_eq!(bytes[0], ICMP_TYPE_TIMESTAMP_REPLY);
        assert_eq!(Icmp::from_bytes(&bytes).unwrap(), ts);

        let mut long = bytes.clone();
        long.extend_from_slice(&[0, 0]);
        let chksum = checksum::ip_checksum_without_field(&long, 2);
        long[2..4].copy_from_slice(&chksum.to_be_bytes());
        assert_eq!(
            Icmp::from_bytes(&long),
            Err(ValidationError::LengthInvalid {
                field: LengthField::IcmpMessage,
                length: 22
            })
        );

        let info = Icmp::Information(Information::new(false, 3, 4));
        let bytes = info.to_bytes();
        assert_eq!(bytes[0], ICMP_TYPE_INFO_REQUEST);
        assert_eq!(Icmp::from_bytes(&bytes).unwrap(), info);
    }

    #[test]
    fn error_messages_round_trip() {
        let original = [0x45u8, 0, 0, 28, 0, 0, 0, 0, 1, 17];
        let messages = [
            Icmp::ParameterProblem(ParameterProblem::new(
                ParameterProblemCode::PointerIndicatesError,
                9,
                &original[..],
            )),
            Icmp::Redirect(Redirect::new(
                RedirectCode::Host,
                Ipv4Addr::new(10, 0, 0, 254),
                &original[..],
            )),
            Icmp::SourceQuench(SourceQuench::new(&original[..])),
            Icmp::TimeExceeded(TimeExceeded::new(
                TimeExceededCode::FragmentReassembly,
                &original[..],
            )),
        ];

        for msg in messages {
            let bytes = msg.to_bytes();
            assert_eq!(bytes.len(), msg.len());
            let decoded = Icmp::from_bytes(&bytes).unwrap();
            assert_eq!(decoded.to_bytes(), bytes);
            assert_eq!(decoded.into_owned(), msg);
        }
    }

    #[test]
    fn truncated_header() {
        assert_eq!(
            Icmp::from_bytes(&ECHO_REQUEST[..7]),
            Err(ValidationError::HeaderIncomplete {
                layer: "ICMP",
                required: 8,
                available: 7
            })
        );
    }
}
