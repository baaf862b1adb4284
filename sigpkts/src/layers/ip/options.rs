// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! IPv4 header options (RFC 791 section 3.1).

use std::net::Ipv4Addr;

use crate::error::{LengthField, TypeField, ValidationError};
use crate::utils;

use sigpkts_common::BufferWrite;

/// End of Option List
pub const OPT_TYPE_EOOL: u8 = 0x00;
/// No Operation
pub const OPT_TYPE_NOP: u8 = 0x01;
/// Record Route
pub const OPT_TYPE_RECORD_ROUTE: u8 = 0x07;
/// Internet Timestamp
pub const OPT_TYPE_TIMESTAMP: u8 = 0x44;
/// Security
pub const OPT_TYPE_SECURITY: u8 = 0x82;
/// Loose Source and Record Route
pub const OPT_TYPE_LOOSE_SOURCE_ROUTE: u8 = 0x83;
/// Stream Identifier
pub const OPT_TYPE_STREAM_ID: u8 = 0x88;
/// Strict Source and Record Route
pub const OPT_TYPE_STRICT_SOURCE_ROUTE: u8 = 0x89;
/// Security, as emitted by stacks that encode the option with class 2 and number 10.
pub const OPT_TYPE_SECURITY_ALT: u8 = 0xCA;

/// The largest number of bytes the options of a single header may occupy.
pub const IPV4_OPTIONS_MAX_LEN: usize = 40;

const SECURITY_OPT_LEN: usize = 11;
const STREAM_ID_OPT_LEN: usize = 4;
const ROUTE_OPT_MIN_LEN: usize = 3;
const TIMESTAMP_OPT_MIN_LEN: usize = 4;

const TIMESTAMP_FLAG_TIMESTAMPS_ONLY: u8 = 0;
const TIMESTAMP_FLAG_ADDRESS_AND_TIMESTAMP: u8 = 1;
const TIMESTAMP_FLAG_PRESPECIFIED: u8 = 3;

/// The class field of an option type octet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Ipv4OptionClass {
    Control = 0,
    Reserved1 = 1,
    DebuggingMeasurement = 2,
    Reserved3 = 3,
}

impl From<u8> for Ipv4OptionClass {
    /// Extracts the class bits from an option type octet.
    fn from(option_type: u8) -> Self {
        match (option_type >> 5) & 0b11 {
            0 => Self::Control,
            1 => Self::Reserved1,
            2 => Self::DebuggingMeasurement,
            _ => Self::Reserved3,
        }
    }
}

/// Security level values of the Security option's S field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityLevel {
    Unclassified,
    Confidential,
    Efto,
    Mmmm,
    Prog,
    Restricted,
    Secret,
    TopSecret,
    /// A value reserved for future use.
    Other(u16),
}

impl From<u16> for SecurityLevel {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::Unclassified,
            0xF135 => Self::Confidential,
            0x789A => Self::Efto,
            0xBC4D => Self::Mmmm,
            0x5E26 => Self::Prog,
            0xAF13 => Self::Restricted,
            0xD788 => Self::Secret,
            0x6BC5 => Self::TopSecret,
            v => Self::Other(v),
        }
    }
}

impl From<SecurityLevel> for u16 {
    fn from(value: SecurityLevel) -> Self {
        match value {
            SecurityLevel::Unclassified => 0x0000,
            SecurityLevel::Confidential => 0xF135,
            SecurityLevel::Efto => 0x789A,
            SecurityLevel::Mmmm => 0xBC4D,
            SecurityLevel::Prog => 0x5E26,
            SecurityLevel::Restricted => 0xAF13,
            SecurityLevel::Secret => 0xD788,
            SecurityLevel::TopSecret => 0x6BC5,
            SecurityLevel::Other(v) => v,
        }
    }
}

/// The Security option.
///
/// The option is recognized under both [`OPT_TYPE_SECURITY`] and [`OPT_TYPE_SECURITY_ALT`]; the
/// type octet it was decoded with is kept so that it is reproduced on encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecurityOption {
    option_type: u8,
    level: SecurityLevel,
    compartments: u16,
    handling_restrictions: u16,
    transmission_control_code: u32,
}

impl SecurityOption {
    /// Creates a Security option with the RFC 791 type octet.
    ///
    /// The Transmission Control Code is a 24-bit field.
    pub fn new(
        level: SecurityLevel,
        compartments: u16,
        handling_restrictions: u16,
        transmission_control_code: u32,
    ) -> Result<Self, ValidationError> {
        if transmission_control_code > 0x00FF_FFFF {
            return Err(ValidationError::ValueOutOfRange {
                field: "IPv4 security transmission control code",
                value: transmission_control_code,
            });
        }

        Ok(Self {
            option_type: OPT_TYPE_SECURITY,
            level,
            compartments,
            handling_restrictions,
            transmission_control_code,
        })
    }

    /// Returns the option re-tagged with a different Security type octet.
    pub fn with_option_type(self, option_type: u8) -> Result<Self, ValidationError> {
        match option_type {
            OPT_TYPE_SECURITY | OPT_TYPE_SECURITY_ALT => Ok(Self {
                option_type,
                ..self
            }),
            t => Err(ValidationError::TypeInvalid {
                field: TypeField::Ipv4OptionType,
                value: t as u16,
            }),
        }
    }

    #[inline]
    pub fn option_type(&self) -> u8 {
        self.option_type
    }

    #[inline]
    pub fn level(&self) -> SecurityLevel {
        self.level
    }

    #[inline]
    pub fn compartments(&self) -> u16 {
        self.compartments
    }

    #[inline]
    pub fn handling_restrictions(&self) -> u16 {
        self.handling_restrictions
    }

    #[inline]
    pub fn transmission_control_code(&self) -> u32 {
        self.transmission_control_code
    }
}

/// The body shared by the Record Route and source routing options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteData {
    pointer: u8,
    route: Vec<Ipv4Addr>,
}

impl RouteData {
    /// The largest number of addresses that fit within the option space of a header.
    pub const MAX_ADDRESSES: usize = (IPV4_OPTIONS_MAX_LEN - ROUTE_OPT_MIN_LEN) / 4;

    pub fn new(pointer: u8, route: Vec<Ipv4Addr>) -> Result<Self, ValidationError> {
        if route.len() > Self::MAX_ADDRESSES {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: ROUTE_OPT_MIN_LEN + 4 * route.len(),
            });
        }

        Ok(Self { pointer, route })
    }

    /// The octet offset (from the start of the option) of the next route slot.
    #[inline]
    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    #[inline]
    pub fn route(&self) -> &[Ipv4Addr] {
        &self.route
    }

    fn len(&self) -> usize {
        ROUTE_OPT_MIN_LEN + 4 * self.route.len()
    }

    fn from_value(option_len: usize, value: &[u8]) -> Result<Self, ValidationError> {
        let Some((&pointer, addrs)) = value.split_first() else {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: option_len,
            });
        };

        if addrs.len() % 4 != 0 {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: option_len,
            });
        }

        Ok(Self {
            pointer,
            route: addrs
                .chunks_exact(4)
                .map(|a| Ipv4Addr::new(a[0], a[1], a[2], a[3]))
                .collect(),
        })
    }

    fn write_value<B: BufferWrite>(&self, bytes: &mut B) {
        bytes.push(self.pointer);
        for addr in &self.route {
            bytes.append(&addr.octets());
        }
    }
}

/// The entries recorded in an Internet Timestamp option, keyed by the option's flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimestampEntries {
    /// Flag 0: a list of 32-bit timestamps.
    TimestampsOnly(Vec<u32>),
    /// Flag 1: each timestamp is preceded by the address of the module that recorded it.
    AddressAndTimestamp(Vec<(Ipv4Addr, u32)>),
    /// Flag 3: the addresses are prespecified by the sender.
    Prespecified(Vec<(Ipv4Addr, u32)>),
}

impl TimestampEntries {
    #[inline]
    pub fn flag(&self) -> u8 {
        match self {
            Self::TimestampsOnly(_) => TIMESTAMP_FLAG_TIMESTAMPS_ONLY,
            Self::AddressAndTimestamp(_) => TIMESTAMP_FLAG_ADDRESS_AND_TIMESTAMP,
            Self::Prespecified(_) => TIMESTAMP_FLAG_PRESPECIFIED,
        }
    }

    fn value_len(&self) -> usize {
        match self {
            Self::TimestampsOnly(t) => 4 * t.len(),
            Self::AddressAndTimestamp(e) | Self::Prespecified(e) => 8 * e.len(),
        }
    }
}

/// The Internet Timestamp option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampOption {
    pointer: u8,
    overflow: u8,
    entries: TimestampEntries,
}

impl TimestampOption {
    /// Creates a timestamp option. `overflow` is a 4-bit counter.
    pub fn new(
        pointer: u8,
        overflow: u8,
        entries: TimestampEntries,
    ) -> Result<Self, ValidationError> {
        if overflow > 0x0F {
            return Err(ValidationError::ValueOutOfRange {
                field: "IPv4 timestamp overflow",
                value: overflow as u32,
            });
        }

        let len = TIMESTAMP_OPT_MIN_LEN + entries.value_len();
        if len > IPV4_OPTIONS_MAX_LEN {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: len,
            });
        }

        Ok(Self {
            pointer,
            overflow,
            entries,
        })
    }

    #[inline]
    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    /// The number of modules that could not register a timestamp for lack of space.
    #[inline]
    pub fn overflow(&self) -> u8 {
        self.overflow
    }

    #[inline]
    pub fn entries(&self) -> &TimestampEntries {
        &self.entries
    }

    fn len(&self) -> usize {
        TIMESTAMP_OPT_MIN_LEN + self.entries.value_len()
    }

    fn from_value(option_len: usize, value: &[u8]) -> Result<Self, ValidationError> {
        let (Some(&pointer), Some(&oflw_flag)) = (value.first(), value.get(1)) else {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: option_len,
            });
        };

        let data = &value[2..];
        let length_err = || ValidationError::LengthInvalid {
            field: LengthField::Ipv4Option,
            length: option_len,
        };

        let pairs = |data: &[u8]| -> Result<Vec<(Ipv4Addr, u32)>, ValidationError> {
            if data.len() % 8 != 0 {
                return Err(length_err());
            }
            Ok(data
                .chunks_exact(8)
                .map(|e| {
                    (
                        Ipv4Addr::new(e[0], e[1], e[2], e[3]),
                        utils::be_u32(e, 4),
                    )
                })
                .collect())
        };

        let entries = match oflw_flag & 0x0F {
            TIMESTAMP_FLAG_TIMESTAMPS_ONLY => {
                if data.len() % 4 != 0 {
                    return Err(length_err());
                }
                TimestampEntries::TimestampsOnly(
                    data.chunks_exact(4).map(|t| utils::be_u32(t, 0)).collect(),
                )
            }
            TIMESTAMP_FLAG_ADDRESS_AND_TIMESTAMP => {
                TimestampEntries::AddressAndTimestamp(pairs(data)?)
            }
            TIMESTAMP_FLAG_PRESPECIFIED => TimestampEntries::Prespecified(pairs(data)?),
            flag => {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::TimestampFlag,
                    value: flag as u16,
                })
            }
        };

        Ok(Self {
            pointer,
            overflow: oflw_flag >> 4,
            entries,
        })
    }

    fn write_value<B: BufferWrite>(&self, bytes: &mut B) {
        bytes.push(self.pointer);
        bytes.push((self.overflow << 4) | self.entries.flag());
        match &self.entries {
            TimestampEntries::TimestampsOnly(timestamps) => {
                for ts in timestamps {
                    bytes.append(&ts.to_be_bytes());
                }
            }
            TimestampEntries::AddressAndTimestamp(entries)
            | TimestampEntries::Prespecified(entries) => {
                for (addr, ts) in entries {
                    bytes.append(&addr.octets());
                    bytes.append(&ts.to_be_bytes());
                }
            }
        }
    }
}

/// A single IPv4 header option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ipv4Option {
    EndOfOptionList,
    NoOperation,
    Security(SecurityOption),
    RecordRoute(RouteData),
    StreamIdentifier(u16),
    InternetTimestamp(TimestampOption),
    LooseSourceRouting(RouteData),
    StrictSourceRouting(RouteData),
}

impl Ipv4Option {
    /// Creates one of the three route-carrying options from its type octet.
    ///
    /// Fails if `option_type` is not Record Route, Loose Source Route or Strict Source Route.
    pub fn route(option_type: u8, data: RouteData) -> Result<Self, ValidationError> {
        match option_type {
            OPT_TYPE_RECORD_ROUTE => Ok(Self::RecordRoute(data)),
            OPT_TYPE_LOOSE_SOURCE_ROUTE => Ok(Self::LooseSourceRouting(data)),
            OPT_TYPE_STRICT_SOURCE_ROUTE => Ok(Self::StrictSourceRouting(data)),
            t => Err(ValidationError::TypeInvalid {
                field: TypeField::Ipv4OptionType,
                value: t as u16,
            }),
        }
    }

    /// The option type octet.
    pub fn option_type(&self) -> u8 {
        match self {
            Self::EndOfOptionList => OPT_TYPE_EOOL,
            Self::NoOperation => OPT_TYPE_NOP,
            Self::Security(s) => s.option_type,
            Self::RecordRoute(_) => OPT_TYPE_RECORD_ROUTE,
            Self::StreamIdentifier(_) => OPT_TYPE_STREAM_ID,
            Self::InternetTimestamp(_) => OPT_TYPE_TIMESTAMP,
            Self::LooseSourceRouting(_) => OPT_TYPE_LOOSE_SOURCE_ROUTE,
            Self::StrictSourceRouting(_) => OPT_TYPE_STRICT_SOURCE_ROUTE,
        }
    }

    /// Whether the option is copied into every fragment of a fragmented datagram.
    #[inline]
    pub fn copied(&self) -> bool {
        self.option_type() & 0x80 != 0
    }

    #[inline]
    pub fn class(&self) -> Ipv4OptionClass {
        Ipv4OptionClass::from(self.option_type())
    }

    #[inline]
    pub fn number(&self) -> u8 {
        self.option_type() & 0x1F
    }

    /// The number of bytes the option occupies, including its type and length octets.
    pub fn len(&self) -> usize {
        match self {
            Self::EndOfOptionList | Self::NoOperation => 1,
            Self::Security(_) => SECURITY_OPT_LEN,
            Self::StreamIdentifier(_) => STREAM_ID_OPT_LEN,
            Self::RecordRoute(r) | Self::LooseSourceRouting(r) | Self::StrictSourceRouting(r) => {
                r.len()
            }
            Self::InternetTimestamp(t) => t.len(),
        }
    }

    /// Decodes the option at the front of `bytes`, returning it along with the bytes that
    /// follow it.
    pub fn split(bytes: &[u8]) -> Result<(Self, &[u8]), ValidationError> {
        let Some((&option_type, rest)) = bytes.split_first() else {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: 0,
            });
        };

        match option_type {
            OPT_TYPE_EOOL => return Ok((Self::EndOfOptionList, rest)),
            OPT_TYPE_NOP => return Ok((Self::NoOperation, rest)),
            OPT_TYPE_SECURITY
            | OPT_TYPE_SECURITY_ALT
            | OPT_TYPE_RECORD_ROUTE
            | OPT_TYPE_STREAM_ID
            | OPT_TYPE_TIMESTAMP
            | OPT_TYPE_LOOSE_SOURCE_ROUTE
            | OPT_TYPE_STRICT_SOURCE_ROUTE => (),
            t => {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::Ipv4OptionType,
                    value: t as u16,
                })
            }
        }

        let option_len = match rest.first() {
            Some(&l) => l as usize,
            None => {
                return Err(ValidationError::LengthInvalid {
                    field: LengthField::Ipv4Option,
                    length: bytes.len(),
                })
            }
        };

        if option_len < 2 || option_len > bytes.len() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: option_len,
            });
        }

        let value = &bytes[2..option_len];
        let option = match option_type {
            OPT_TYPE_SECURITY | OPT_TYPE_SECURITY_ALT => {
                utils::exact_len(
                    value,
                    SECURITY_OPT_LEN - 2,
                    LengthField::Ipv4Option,
                    option_len,
                )?;
                Self::Security(SecurityOption {
                    option_type,
                    level: SecurityLevel::from(utils::be_u16(value, 0)),
                    compartments: utils::be_u16(value, 2),
                    handling_restrictions: utils::be_u16(value, 4),
                    transmission_control_code: u32::from_be_bytes([
                        0, value[6], value[7], value[8],
                    ]),
                })
            }
            OPT_TYPE_STREAM_ID => {
                utils::exact_len(
                    value,
                    STREAM_ID_OPT_LEN - 2,
                    LengthField::Ipv4Option,
                    option_len,
                )?;
                Self::StreamIdentifier(utils::be_u16(value, 0))
            }
            OPT_TYPE_RECORD_ROUTE => Self::RecordRoute(RouteData::from_value(option_len, value)?),
            OPT_TYPE_LOOSE_SOURCE_ROUTE => {
                Self::LooseSourceRouting(RouteData::from_value(option_len, value)?)
            }
            OPT_TYPE_STRICT_SOURCE_ROUTE => {
                Self::StrictSourceRouting(RouteData::from_value(option_len, value)?)
            }
            _ => Self::InternetTimestamp(TimestampOption::from_value(option_len, value)?),
        };

        Ok((option, &bytes[option_len..]))
    }

    pub(crate) fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
        bytes.push(self.option_type());
        match self {
            Self::EndOfOptionList | Self::NoOperation => return,
            _ => bytes.push(self.len() as u8),
        }

        match self {
            Self::Security(s) => {
                bytes.append(&u16::from(s.level).to_be_bytes());
                bytes.append(&s.compartments.to_be_bytes());
                bytes.append(&s.handling_restrictions.to_be_bytes());
                bytes.append(&s.transmission_control_code.to_be_bytes()[1..]);
            }
            Self::StreamIdentifier(id) => bytes.append(&id.to_be_bytes()),
            Self::RecordRoute(r) | Self::LooseSourceRouting(r) | Self::StrictSourceRouting(r) => {
                r.write_value(bytes)
            }
            Self::InternetTimestamp(t) => t.write_value(bytes),
            Self::EndOfOptionList | Self::NoOperation => (),
        }
    }
}

/// Decodes the options region of a header (everything between the fixed 20 bytes and the
/// Internet Header Length).
///
/// Decoding stops at an End of Option List. The bytes after it are padding: they must be zero,
/// and there may be no more of them than needed to reach the next 32-bit boundary.
pub(crate) fn parse_options(region: &[u8], header_len: usize) -> Result<Vec<Ipv4Option>, ValidationError> {
    let mut options = Vec::new();
    let mut remaining = region;
    while !remaining.is_empty() {
        let (option, rest) = Ipv4Option::split(remaining)?;
        remaining = rest;
        let end = option == Ipv4Option::EndOfOptionList;
        options.push(option);
        if end {
            break;
        }
    }

    let consumed = region.len() - remaining.len();
    let padding_valid = remaining.iter().all(|&b| b == 0);
    if utils::padded_length::<4>(consumed) != region.len() || !padding_valid {
        return Err(ValidationError::LengthInvalid {
            field: LengthField::Ipv4Header,
            length: header_len,
        });
    }

    Ok(options)
}

/// Checks that an option list can be encoded into a header and decoded back unchanged.
pub(crate) fn validate_options(options: &[Ipv4Option]) -> Result<(), ValidationError> {
    let len: usize = options.iter().map(Ipv4Option::len).sum();
    let header_err = ValidationError::LengthInvalid {
        field: LengthField::Ipv4Header,
        length: 20 + utils::padded_length::<4>(len),
    };

    if len > IPV4_OPTIONS_MAX_LEN {
        return Err(header_err);
    }

    // Nothing may follow an End of Option List, and zero padding is only unambiguous after one.
    match options
        .iter()
        .position(|o| *o == Ipv4Option::EndOfOptionList)
    {
        Some(idx) if idx + 1 != options.len() => Err(header_err),
        None if len % 4 != 0 => Err(header_err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_option() {
        let bytes = [0xCA, 11, 0xD7, 0x88, 0, 2, 0, 3, 0, 0, 4];
        let (option, rest) = Ipv4Option::split(&bytes).unwrap();
        assert!(rest.is_empty());

        let Ipv4Option::Security(sec) = &option else {
            panic!("expected Security option, got {:?}", option);
        };
        assert_eq!(sec.level(), SecurityLevel::Secret);
        assert_eq!(sec.compartments(), 2);
        assert_eq!(sec.handling_restrictions(), 3);
        assert_eq!(sec.transmission_control_code(), 4);

        let expected = SecurityOption::new(SecurityLevel::Secret, 2, 3, 4)
            .and_then(|s| s.with_option_type(OPT_TYPE_SECURITY_ALT))
            .unwrap();
        assert_eq!(option, Ipv4Option::Security(expected));

        let mut out = Vec::new();
        option.to_bytes_extended(&mut out);
        assert_eq!(out, bytes);
    }

    #[test]
    fn security_option_length_is_exact() {
        let bytes = [0x82, 10, 0xD7, 0x88, 0, 2, 0, 3, 0, 0];
        assert_eq!(
            Ipv4Option::split(&bytes),
            Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Option,
                length: 10
            })
        );
    }

    #[test]
    fn record_route_units() {
        let bytes = [0x07, 11, 4, 10, 0, 0, 1, 10, 0, 0, 2];
        let (option, _) = Ipv4Option::split(&bytes).unwrap();
        let Ipv4Option::RecordRoute(route) = &option else {
            panic!("expected Record Route option, got {:?}", option);
        };
        assert_eq!(route.pointer(), 4);
        assert_eq!(
            route.route(),
            &[Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)]
        );
        assert_eq!(option.len(), 11);
        assert!(!option.copied());
        assert_eq!(option.class(), Ipv4OptionClass::Control);

        let misaligned = [0x07, 6, 4, 10, 0, 0];
        assert!(matches!(
            Ipv4Option::split(&misaligned),
            Err(ValidationError::LengthInvalid { length: 6, .. })
        ));
    }

    #[test]
    fn route_constructor_rejects_other_types() {
        let data = RouteData::new(4, vec![Ipv4Addr::LOCALHOST]).unwrap();
        assert_eq!(
            Ipv4Option::route(OPT_TYPE_STREAM_ID, data.clone()),
            Err(ValidationError::TypeInvalid {
                field: TypeField::Ipv4OptionType,
                value: OPT_TYPE_STREAM_ID as u16
            })
        );
        let option = Ipv4Option::route(OPT_TYPE_STRICT_SOURCE_ROUTE, data).unwrap();
        assert!(option.copied());
        assert_eq!(option.number(), 9);

        assert!(RouteData::new(4, vec![Ipv4Addr::UNSPECIFIED; 10]).is_err());
    }

    #[test]
    fn stream_identifier() {
        let (option, rest) = Ipv4Option::split(&[0x88, 4, 0x12, 0x34, 0]).unwrap();
        assert_eq!(option, Ipv4Option::StreamIdentifier(0x1234));
        assert_eq!(rest, &[0]);
        assert!(Ipv4Option::split(&[0x88, 5, 0x12, 0x34, 0]).is_err());
    }

    #[test]
    fn timestamp_flags() {
        let bytes = [0x44, 12, 5, 0x11, 192, 168, 0, 1, 0, 0, 0, 42];
        let (option, _) = Ipv4Option::split(&bytes).unwrap();
        let expected = TimestampOption::new(
            5,
            1,
            TimestampEntries::AddressAndTimestamp(vec![(Ipv4Addr::new(192, 168, 0, 1), 42)]),
        )
        .unwrap();
        assert_eq!(option, Ipv4Option::InternetTimestamp(expected));

        let mut out = Vec::new();
        option.to_bytes_extended(&mut out);
        assert_eq!(out, bytes);

        let bad_flag = [0x44, 8, 5, 0x02, 0, 0, 0, 1];
        assert_eq!(
            Ipv4Option::split(&bad_flag),
            Err(ValidationError::TypeInvalid {
                field: TypeField::TimestampFlag,
                value: 2
            })
        );
    }

    #[test]
    fn unknown_option_type() {
        assert_eq!(
            Ipv4Option::split(&[0x94, 4, 0, 0]),
            Err(ValidationError::TypeInvalid {
                field: TypeField::Ipv4OptionType,
                value: 0x94
            })
        );
    }

    #[test]
    fn options_region_padding() {
        let region = [0x01, 0x88, 4, 0, 7, 0x00, 0, 0];
        let options = parse_options(&region, 28).unwrap();
        assert_eq!(
            options,
            [
                Ipv4Option::NoOperation,
                Ipv4Option::StreamIdentifier(7),
                Ipv4Option::EndOfOptionList
            ]
        );
        validate_options(&options).unwrap();

        let region = [0x01, 0x88, 4, 0, 7, 0x00, 0xee, 0];
        assert_eq!(
            parse_options(&region, 28),
            Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Header,
                length: 28
            })
        );

        // A whole word of padding after the end of the list is more than alignment requires.
        let region = [0x00, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            parse_options(&region, 28),
            Err(ValidationError::LengthInvalid {
                field: LengthField::Ipv4Header,
                length: 28
            })
        );
    }

    #[test]
    fn option_lists_that_cannot_round_trip() {
        assert!(validate_options(&[Ipv4Option::NoOperation]).is_err());
        assert!(validate_options(&[
            Ipv4Option::EndOfOptionList,
            Ipv4Option::NoOperation
        ])
        .is_err());
        assert!(validate_options(&[
            Ipv4Option::NoOperation,
            Ipv4Option::NoOperation,
            Ipv4Option::NoOperation,
            Ipv4Option::NoOperation,
        ])
        .is_ok());
    }
}
