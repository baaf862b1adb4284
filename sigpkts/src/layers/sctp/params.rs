// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Variable-length parameters carried by INIT, INIT ACK and HEARTBEAT chunks.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::Deref;

use sigpkts_common::BufferWrite;

use crate::error::{LengthField, TypeField, ValidationError};
use crate::layers::tlv::{self, Tlv, TlvValue, TLV_HEADER_LEN};
use crate::layers::traits::*;
use crate::utils;

pub const PARAM_TYPE_HEARTBEAT_INFO: u16 = 1;
pub const PARAM_TYPE_IPV4_ADDRESS: u16 = 5;
pub const PARAM_TYPE_IPV6_ADDRESS: u16 = 6;
pub const PARAM_TYPE_STATE_COOKIE: u16 = 7;
pub const PARAM_TYPE_UNRECOGNIZED_PARAM: u16 = 8;
pub const PARAM_TYPE_COOKIE_PRESERVATIVE: u16 = 9;
pub const PARAM_TYPE_HOST_NAME: u16 = 11;
pub const PARAM_TYPE_SUPPORTED_ADDR_TYPES: u16 = 12;
/// ECN Capable (reserved by RFC 9260 Appendix A)
pub const PARAM_TYPE_ECN_CAPABLE: u16 = 0x8000;
/// Forward-TSN-Supported (RFC 3758)
pub const PARAM_TYPE_FORWARD_TSN_SUPPORTED: u16 = 0xC000;

/// A list of 16-bit parameter types, as carried by Supported Address Types parameters and
/// Missing Mandatory Parameter causes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParameterTypes(Vec<u16>);

impl ParameterTypes {
    /// The most types that fit in a TLV alongside a 4-byte count field.
    pub const MAX_LEN: usize = (TlvValue::MAX_LEN - 4) / 2;

    pub fn new(types: Vec<u16>) -> Result<Self, ValidationError> {
        if types.len() > Self::MAX_LEN {
            return Err(ValidationError::ValueOutOfRange {
                field: "SCTP parameter type count",
                value: u32::try_from(types.len()).unwrap_or(u32::MAX),
            });
        }
        Ok(Self(types))
    }

    /// Decodes a run of big-endian types, failing with `length_err` on a partial entry or an
    /// oversized list.
    pub(crate) fn decode(
        value: &[u8],
        length_err: ValidationError,
    ) -> Result<Self, ValidationError> {
        if value.len() % 2 != 0 || value.len() / 2 > Self::MAX_LEN {
            return Err(length_err);
        }
        Ok(Self(
            value
                .chunks_exact(2)
                .map(|t| u16::from_be_bytes([t[0], t[1]]))
                .collect(),
        ))
    }

    pub(crate) fn write<B: BufferWrite>(&self, bytes: &mut B) {
        for t in &self.0 {
            bytes.append(&t.to_be_bytes());
        }
    }
}

impl Deref for ParameterTypes {
    type Target = [u16];

    #[inline]
    fn deref(&self) -> &[u16] {
        &self.0
    }
}

/// A parameter of an SCTP control chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkParameter<'a> {
    /// Opaque sender-specific data echoed back in a HEARTBEAT ACK.
    HeartbeatInfo(TlvValue<'a>),
    Ipv4Address(Ipv4Addr),
    Ipv6Address(Ipv6Addr),
    /// Opaque cookie the receiver of an INIT ACK must echo back.
    StateCookie(TlvValue<'a>),
    /// An unrecognized parameter (header included) reported back to its sender.
    UnrecognizedParameter(TlvValue<'a>),
    /// Suggested cookie life-span increment, in milliseconds.
    CookiePreservative(u32),
    /// A NUL-terminated host name.
    HostName(TlvValue<'a>),
    /// The address parameter types the sender supports.
    SupportedAddressTypes(ParameterTypes),
    EcnCapable,
    ForwardTsnSupported,
}

impl<'a> ChunkParameter<'a> {
    /// The Parameter Type field.
    pub fn parameter_type(&self) -> u16 {
        match self {
            Self::HeartbeatInfo(_) => PARAM_TYPE_HEARTBEAT_INFO,
            Self::Ipv4Address(_) => PARAM_TYPE_IPV4_ADDRESS,
            Self::Ipv6Address(_) => PARAM_TYPE_IPV6_ADDRESS,
            Self::StateCookie(_) => PARAM_TYPE_STATE_COOKIE,
            Self::UnrecognizedParameter(_) => PARAM_TYPE_UNRECOGNIZED_PARAM,
            Self::CookiePreservative(_) => PARAM_TYPE_COOKIE_PRESERVATIVE,
            Self::HostName(_) => PARAM_TYPE_HOST_NAME,
            Self::SupportedAddressTypes(_) => PARAM_TYPE_SUPPORTED_ADDR_TYPES,
            Self::EcnCapable => PARAM_TYPE_ECN_CAPABLE,
            Self::ForwardTsnSupported => PARAM_TYPE_FORWARD_TSN_SUPPORTED,
        }
    }

    /// The Parameter Length field: the header plus the value, excluding padding.
    #[inline]
    pub fn unpadded_len(&self) -> usize {
        TLV_HEADER_LEN + self.value_len()
    }

    fn value_len(&self) -> usize {
        match self {
            Self::HeartbeatInfo(v)
            | Self::StateCookie(v)
            | Self::UnrecognizedParameter(v)
            | Self::HostName(v) => v.len(),
            Self::Ipv4Address(_) | Self::CookiePreservative(_) => 4,
            Self::Ipv6Address(_) => 16,
            Self::SupportedAddressTypes(t) => 2 * t.len(),
            Self::EcnCapable | Self::ForwardTsnSupported => 0,
        }
    }

    /// The smallest value length the parameter may carry.
    fn min_value_len(&self) -> usize {
        match self {
            Self::UnrecognizedParameter(_) => TLV_HEADER_LEN,
            Self::HostName(_) => 1,
            Self::SupportedAddressTypes(_) => 2,
            _ => 0,
        }
    }

    /// Checks that the parameter's value meets the minimum length of its declared shape.
    ///
    /// Decoded parameters always pass; chunk constructors call this for every parameter they
    /// are given.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.value_len();
        if len < self.min_value_len() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::ChunkParameter,
                length: TLV_HEADER_LEN + len,
            });
        }
        Ok(())
    }

    /// Decodes a parameter from an already-framed TLV.
    pub(crate) fn from_tlv(tlv: Tlv<'a>) -> Result<Self, ValidationError> {
        let value = tlv.value();
        let length_err = ValidationError::LengthInvalid {
            field: LengthField::ChunkParameter,
            length: tlv.unpadded_len(),
        };
        let exact = |len: usize| {
            utils::exact_len(value, len, LengthField::ChunkParameter, tlv.unpadded_len())
        };

        let param = match tlv.tlv_type() {
            PARAM_TYPE_HEARTBEAT_INFO => Self::HeartbeatInfo(TlvValue::decoded(value)),
            PARAM_TYPE_IPV4_ADDRESS => {
                exact(4)?;
                Self::Ipv4Address(Ipv4Addr::from(utils::be_u32(value, 0)))
            }
            PARAM_TYPE_IPV6_ADDRESS => {
                exact(16)?;
                Self::Ipv6Address(Ipv6Addr::from(
                    utils::to_array::<16>(value, 0).unwrap_or_default(),
                ))
            }
            PARAM_TYPE_STATE_COOKIE => Self::StateCookie(TlvValue::decoded(value)),
            PARAM_TYPE_UNRECOGNIZED_PARAM => Self::UnrecognizedParameter(TlvValue::decoded(value)),
            PARAM_TYPE_COOKIE_PRESERVATIVE => {
                exact(4)?;
                Self::CookiePreservative(utils::be_u32(value, 0))
            }
            PARAM_TYPE_HOST_NAME => Self::HostName(TlvValue::decoded(value)),
            PARAM_TYPE_SUPPORTED_ADDR_TYPES => {
                Self::SupportedAddressTypes(ParameterTypes::decode(value, length_err)?)
            }
            PARAM_TYPE_ECN_CAPABLE => {
                exact(0)?;
                Self::EcnCapable
            }
            PARAM_TYPE_FORWARD_TSN_SUPPORTED => {
                exact(0)?;
                Self::ForwardTsnSupported
            }
            t => {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::ParameterType,
                    value: t,
                })
            }
        };

        if param.value_len() < param.min_value_len() {
            return Err(length_err);
        }

        Ok(param)
    }

    /// Writes the parameter and its padding, returning the offset at which the unpadded
    /// parameter ends.
    pub(crate) fn write<B: BufferWrite>(&self, bytes: &mut B) -> usize {
        tlv::write_tlv(bytes, self.parameter_type(), |bytes| match self {
            Self::HeartbeatInfo(v)
            | Self::StateCookie(v)
            | Self::UnrecognizedParameter(v)
            | Self::HostName(v) => bytes.append(v),
            Self::Ipv4Address(addr) => bytes.append(&addr.octets()),
            Self::Ipv6Address(addr) => bytes.append(&addr.octets()),
            Self::CookiePreservative(increment) => bytes.append(&increment.to_be_bytes()),
            Self::SupportedAddressTypes(types) => types.write(bytes),
            Self::EcnCapable | Self::ForwardTsnSupported => (),
        })
    }
}

impl<'a> FromBytes<'a> for ChunkParameter<'a> {
    fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        let (tlv, rem) = Tlv::split(bytes, LengthField::ChunkParameter)?;
        if !rem.is_empty() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::ChunkParameter,
                length: tlv.unpadded_len(),
            });
        }
        Self::from_tlv(tlv)
    }
}

impl LayerLength for ChunkParameter<'_> {
    #[inline]
    fn len(&self) -> usize {
        utils::padded_length::<4>(self.unpadded_len())
    }
}

impl ToBytes for ChunkParameter<'_> {
    #[inline]
    fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
        self.write(bytes);
    }
}

impl IntoOwned for ChunkParameter<'_> {
    type Owned = ChunkParameter<'static>;

    fn into_owned(self) -> Self::Owned {
        match self {
            Self::HeartbeatInfo(v) => ChunkParameter::HeartbeatInfo(v.into_owned()),
            Self::Ipv4Address(a) => ChunkParameter::Ipv4Address(a),
            Self::Ipv6Address(a) => ChunkParameter::Ipv6Address(a),
            Self::StateCookie(v) => ChunkParameter::StateCookie(v.into_owned()),
            Self::UnrecognizedParameter(v) => ChunkParameter::UnrecognizedParameter(v.into_owned()),
            Self::CookiePreservative(i) => ChunkParameter::CookiePreservative(i),
            Self::HostName(v) => ChunkParameter::HostName(v.into_owned()),
            Self::SupportedAddressTypes(t) => ChunkParameter::SupportedAddressTypes(t),
            Self::EcnCapable => ChunkParameter::EcnCapable,
            Self::ForwardTsnSupported => ChunkParameter::ForwardTsnSupported,
        }
    }
}

impl Framed for ChunkParameter<'_> {
    const PREFIX_LEN: usize = TLV_HEADER_LEN;

    fn frame_len(prefix: &[u8]) -> Result<usize, ValidationError> {
        tlv_frame_len(prefix, LengthField::ChunkParameter)
    }
}

impl_decode_owned!(ChunkParameter);

/// The padded size of a TLV given its 4-byte header.
pub(crate) fn tlv_frame_len(prefix: &[u8], field: LengthField) -> Result<usize, ValidationError> {
    let Some(length) = utils::get_array(prefix, 2).map(|&a| u16::from_be_bytes(a)) else {
        return Err(ValidationError::HeaderIncomplete {
            layer: "SCTP TLV",
            required: TLV_HEADER_LEN,
            available: prefix.len(),
        });
    };

    let length = length as usize;
    if length < TLV_HEADER_LEN {
        return Err(ValidationError::LengthInvalid { field, length });
    }

    Ok(utils::padded_length::<4>(length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_shape_values_are_exact() {
        assert_eq!(
            ChunkParameter::from_bytes(&[0, 9, 0, 8, 0, 0, 0x75, 0x30]),
            Ok(ChunkParameter::CookiePreservative(30000))
        );
        assert_eq!(
            ChunkParameter::from_bytes(&[0, 9, 0, 12, 0, 0, 0x75, 0x30, 0, 0, 0, 0]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::ChunkParameter,
                length: 12
            })
        );
        assert_eq!(
            ChunkParameter::from_bytes(&[0, 5, 0, 7, 10, 0, 0, 0]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::ChunkParameter,
                length: 7
            })
        );
    }

    #[test]
    fn addresses() {
        let v6 = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
        let param = ChunkParameter::Ipv6Address(v6);
        let bytes = param.to_bytes();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[..4], &[0, 6, 0, 20]);
        assert_eq!(ChunkParameter::from_bytes(&bytes), Ok(param));

        assert_eq!(
            ChunkParameter::from_bytes(&[0, 5, 0, 8, 192, 0, 2, 1]),
            Ok(ChunkParameter::Ipv4Address(Ipv4Addr::new(192, 0, 2, 1)))
        );
    }

    #[test]
    fn host_name_padding() {
        let param = ChunkParameter::HostName(TlvValue::new(&b"peer\0"[..]).unwrap());
        assert_eq!(param.unpadded_len(), 9);
        assert_eq!(param.len(), 12);
        let bytes = param.to_bytes();
        assert_eq!(bytes, [0, 11, 0, 9, b'p', b'e', b'e', b'r', 0, 0, 0, 0]);

        let decoded = ChunkParameter::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, param);
        assert_eq!(ChunkParameter::frame_len(&bytes[..4]), Ok(12));
    }

    #[test]
    fn supported_address_types() {
        let bytes = [0, 12, 0, 6, 0, 5, 0, 0];
        assert_eq!(
            ChunkParameter::from_bytes(&bytes),
            Ok(ChunkParameter::SupportedAddressTypes(
                ParameterTypes::new(vec![5]).unwrap()
            ))
        );
        assert!(ChunkParameter::from_bytes(&[0, 12, 0, 4]).is_err());
        assert!(ChunkParameter::from_bytes(&[0, 12, 0, 7, 0, 5, 0, 0]).is_err());
    }

    #[test]
    fn unknown_parameter_type() {
        assert_eq!(
            ChunkParameter::from_bytes(&[0x80, 0x08, 0, 4]),
            Err(ValidationError::TypeInvalid {
                field: TypeField::ParameterType,
                value: 0x8008
            })
        );
    }

    #[test]
    fn flag_parameters() {
        assert_eq!(
            ChunkParameter::from_bytes(&[0x80, 0, 0, 4]),
            Ok(ChunkParameter::EcnCapable)
        );
        assert_eq!(
            ChunkParameter::ForwardTsnSupported.to_bytes(),
            [0xc0, 0, 0, 4]
        );
    }

    #[test]
    fn validate_bounds() {
        assert!(ChunkParameter::HostName(TlvValue::default())
            .validate()
            .is_err());
        assert!(ChunkParameter::StateCookie(TlvValue::default())
            .validate()
            .is_ok());
    }

    #[test]
    fn oversized_values_cannot_be_built() {
        assert!(TlvValue::new(vec![b'a'; 70_000]).is_err());
        assert!(ParameterTypes::new(vec![5; ParameterTypes::MAX_LEN + 1]).is_err());

        let types = ParameterTypes::new(vec![5; ParameterTypes::MAX_LEN]).unwrap();
        let param = ChunkParameter::SupportedAddressTypes(types);
        let bytes = param.to_bytes();
        assert_eq!(
            u16::from_be_bytes([bytes[2], bytes[3]]) as usize,
            param.unpadded_len()
        );
        assert_eq!(ChunkParameter::from_bytes(&bytes), Ok(param));

        let host = TlvValue::new(vec![b'a'; TlvValue::MAX_LEN]).unwrap();
        let bytes = ChunkParameter::HostName(host).to_bytes();
        assert_eq!(&bytes[..4], &[0, 11, 0xff, 0xff]);
    }
}
