// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error causes carried by ABORT and ERROR chunks.

use sigpkts_common::BufferWrite;

use crate::error::{LengthField, TypeField, ValidationError};
use crate::layers::tlv::{self, Tlv, TlvValue, TLV_HEADER_LEN};
use crate::layers::traits::*;
use crate::utils;

use super::params::{tlv_frame_len, ParameterTypes};

pub const ERR_CODE_INVALID_STREAM_ID: u16 = 1;
pub const ERR_CODE_MISSING_MAND_PARAM: u16 = 2;
pub const ERR_CODE_STALE_COOKIE: u16 = 3;
pub const ERR_CODE_OUT_OF_RESOURCE: u16 = 4;
pub const ERR_CODE_UNRESOLVABLE_ADDRESS: u16 = 5;
pub const ERR_CODE_UNRECOGNIZED_CHUNK: u16 = 6;
pub const ERR_CODE_INVALID_MAND_PARAM: u16 = 7;
pub const ERR_CODE_UNRECOGNIZED_PARAMS: u16 = 8;
pub const ERR_CODE_NO_USER_DATA: u16 = 9;
pub const ERR_CODE_COOKIE_RCVD_SHUTTING_DOWN: u16 = 10;
pub const ERR_CODE_RESTART_ASSOC_NEW_ADDR: u16 = 11;
pub const ERR_CODE_USER_INITIATED_ABORT: u16 = 12;
pub const ERR_CODE_PROTOCOL_VIOLATION: u16 = 13;

/// The reason an SCTP endpoint reported an error or aborted an association.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCause<'a> {
    /// Data was received for a stream that does not exist.
    InvalidStreamIdentifier(u16),
    /// One or more mandatory parameters (listed by type) were absent.
    MissingMandatoryParameter(ParameterTypes),
    /// A cookie arrived after its lifespan; holds the staleness in microseconds.
    StaleCookie(u32),
    OutOfResource,
    /// The unresolvable address parameter, header included.
    UnresolvableAddress(TlvValue<'a>),
    /// The unrecognized chunk, header included.
    UnrecognizedChunkType(TlvValue<'a>),
    InvalidMandatoryParameter,
    /// The unrecognized parameters, headers included.
    UnrecognizedParameters(TlvValue<'a>),
    /// The TSN of a DATA chunk that carried no user data.
    NoUserData(u32),
    CookieReceivedWhileShuttingDown,
    /// The address parameters added by the restarting peer.
    RestartWithNewAddresses(TlvValue<'a>),
    /// Upper-layer abort reason.
    UserInitiatedAbort(TlvValue<'a>),
    /// Additional diagnostic information.
    ProtocolViolation(TlvValue<'a>),
}

impl<'a> ErrorCause<'a> {
    /// The Cause Code field.
    pub fn cause_code(&self) -> u16 {
        match self {
            Self::InvalidStreamIdentifier(_) => ERR_CODE_INVALID_STREAM_ID,
            Self::MissingMandatoryParameter(_) => ERR_CODE_MISSING_MAND_PARAM,
            Self::StaleCookie(_) => ERR_CODE_STALE_COOKIE,
            Self::OutOfResource => ERR_CODE_OUT_OF_RESOURCE,
            Self::UnresolvableAddress(_) => ERR_CODE_UNRESOLVABLE_ADDRESS,
            Self::UnrecognizedChunkType(_) => ERR_CODE_UNRECOGNIZED_CHUNK,
            Self::InvalidMandatoryParameter => ERR_CODE_INVALID_MAND_PARAM,
            Self::UnrecognizedParameters(_) => ERR_CODE_UNRECOGNIZED_PARAMS,
            Self::NoUserData(_) => ERR_CODE_NO_USER_DATA,
            Self::CookieReceivedWhileShuttingDown => ERR_CODE_COOKIE_RCVD_SHUTTING_DOWN,
            Self::RestartWithNewAddresses(_) => ERR_CODE_RESTART_ASSOC_NEW_ADDR,
            Self::UserInitiatedAbort(_) => ERR_CODE_USER_INITIATED_ABORT,
            Self::ProtocolViolation(_) => ERR_CODE_PROTOCOL_VIOLATION,
        }
    }

    /// The Cause Length field: the header plus the value, excluding padding.
    #[inline]
    pub fn unpadded_len(&self) -> usize {
        TLV_HEADER_LEN + self.value_len()
    }

    fn value_len(&self) -> usize {
        match self {
            Self::InvalidStreamIdentifier(_) | Self::StaleCookie(_) | Self::NoUserData(_) => 4,
            Self::MissingMandatoryParameter(missing) => 4 + 2 * missing.len(),
            Self::OutOfResource
            | Self::InvalidMandatoryParameter
            | Self::CookieReceivedWhileShuttingDown => 0,
            Self::UnresolvableAddress(v)
            | Self::UnrecognizedChunkType(v)
            | Self::UnrecognizedParameters(v)
            | Self::RestartWithNewAddresses(v)
            | Self::UserInitiatedAbort(v)
            | Self::ProtocolViolation(v) => v.len(),
        }
    }

    fn min_value_len(&self) -> usize {
        match self {
            // Each of these embeds at least one TLV or chunk header.
            Self::UnresolvableAddress(_)
            | Self::UnrecognizedChunkType(_)
            | Self::UnrecognizedParameters(_) => 4,
            _ => 0,
        }
    }

    /// Checks that the cause's value meets the minimum length of its declared shape.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.value_len();
        if len < self.min_value_len() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::ErrorCause,
                length: TLV_HEADER_LEN + len,
            });
        }
        Ok(())
    }

    pub(crate) fn from_tlv(tlv: Tlv<'a>) -> Result<Self, ValidationError> {
        let value = tlv.value();
        let length = tlv.unpadded_len();
        let exact = |len: usize| utils::exact_len(value, len, LengthField::ErrorCause, length);

        let cause = match tlv.tlv_type() {
            ERR_CODE_INVALID_STREAM_ID => {
                exact(4)?;
                // The second half of the value is reserved.
                Self::InvalidStreamIdentifier(utils::be_u16(value, 0))
            }
            ERR_CODE_MISSING_MAND_PARAM => {
                if value.len() < 4 {
                    return Err(ValidationError::LengthInvalid {
                        field: LengthField::ErrorCause,
                        length,
                    });
                }
                let length_err = ValidationError::LengthInvalid {
                    field: LengthField::ErrorCause,
                    length,
                };
                let count = utils::be_u32(value, 0) as usize;
                let missing = ParameterTypes::decode(&value[4..], length_err)?;
                if missing.len() != count {
                    return Err(length_err);
                }
                Self::MissingMandatoryParameter(missing)
            }
            ERR_CODE_STALE_COOKIE => {
                exact(4)?;
                Self::StaleCookie(utils::be_u32(value, 0))
            }
            ERR_CODE_OUT_OF_RESOURCE => {
                exact(0)?;
                Self::OutOfResource
            }
            ERR_CODE_UNRESOLVABLE_ADDRESS => Self::UnresolvableAddress(TlvValue::decoded(value)),
            ERR_CODE_UNRECOGNIZED_CHUNK => Self::UnrecognizedChunkType(TlvValue::decoded(value)),
            ERR_CODE_INVALID_MAND_PARAM => {
                exact(0)?;
                Self::InvalidMandatoryParameter
            }
            ERR_CODE_UNRECOGNIZED_PARAMS => Self::UnrecognizedParameters(TlvValue::decoded(value)),
            ERR_CODE_NO_USER_DATA => {
                exact(4)?;
                Self::NoUserData(utils::be_u32(value, 0))
            }
            ERR_CODE_COOKIE_RCVD_SHUTTING_DOWN => {
                exact(0)?;
                Self::CookieReceivedWhileShuttingDown
            }
            ERR_CODE_RESTART_ASSOC_NEW_ADDR => {
                Self::RestartWithNewAddresses(TlvValue::decoded(value))
            }
            ERR_CODE_USER_INITIATED_ABORT => Self::UserInitiatedAbort(TlvValue::decoded(value)),
            ERR_CODE_PROTOCOL_VIOLATION => Self::ProtocolViolation(TlvValue::decoded(value)),
            code => {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::ErrorCauseCode,
                    value: code,
                })
            }
        };

        if value.len() < cause.min_value_len() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::ErrorCause,
                length,
            });
        }

        Ok(cause)
    }

    /// Writes the cause and its padding, returning the offset at which the unpadded cause ends.
    pub(crate) fn write<B: BufferWrite>(&self, bytes: &mut B) -> usize {
        tlv::write_tlv(bytes, self.cause_code(), |bytes| match self {
            Self::InvalidStreamIdentifier(stream_id) => {
                bytes.append(&stream_id.to_be_bytes());
                bytes.append(&[0, 0]);
            }
            Self::MissingMandatoryParameter(missing) => {
                bytes.append(&(missing.len() as u32).to_be_bytes());
                missing.write(bytes);
            }
            Self::StaleCookie(v) | Self::NoUserData(v) => bytes.append(&v.to_be_bytes()),
            Self::OutOfResource
            | Self::InvalidMandatoryParameter
            | Self::CookieReceivedWhileShuttingDown => (),
            Self::UnresolvableAddress(v)
            | Self::UnrecognizedChunkType(v)
            | Self::UnrecognizedParameters(v)
            | Self::RestartWithNewAddresses(v)
            | Self::UserInitiatedAbort(v)
            | Self::ProtocolViolation(v) => bytes.append(v),
        })
    }
}

impl<'a> FromBytes<'a> for ErrorCause<'a> {
    fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        let (tlv, rem) = Tlv::split(bytes, LengthField::ErrorCause)?;
        if !rem.is_empty() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::ErrorCause,
                length: tlv.unpadded_len(),
            });
        }
        Self::from_tlv(tlv)
    }
}

impl LayerLength for ErrorCause<'_> {
    #[inline]
    fn len(&self) -> usize {
        utils::padded_length::<4>(self.unpadded_len())
    }
}

impl ToBytes for ErrorCause<'_> {
    #[inline]
    fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
        self.write(bytes);
    }
}

impl IntoOwned for ErrorCause<'_> {
    type Owned = ErrorCause<'static>;

    fn into_owned(self) -> Self::Owned {
        match self {
            Self::InvalidStreamIdentifier(s) => ErrorCause::InvalidStreamIdentifier(s),
            Self::MissingMandatoryParameter(m) => ErrorCause::MissingMandatoryParameter(m),
            Self::StaleCookie(s) => ErrorCause::StaleCookie(s),
            Self::OutOfResource => ErrorCause::OutOfResource,
            Self::UnresolvableAddress(v) => ErrorCause::UnresolvableAddress(v.into_owned()),
            Self::UnrecognizedChunkType(v) => ErrorCause::UnrecognizedChunkType(v.into_owned()),
            Self::InvalidMandatoryParameter => ErrorCause::InvalidMandatoryParameter,
            Self::UnrecognizedParameters(v) => ErrorCause::UnrecognizedParameters(v.into_owned()),
            Self::NoUserData(tsn) => ErrorCause::NoUserData(tsn),
            Self::CookieReceivedWhileShuttingDown => ErrorCause::CookieReceivedWhileShuttingDown,
            Self::RestartWithNewAddresses(v) => ErrorCause::RestartWithNewAddresses(v.into_owned()),
            Self::UserInitiatedAbort(v) => ErrorCause::UserInitiatedAbort(v.into_owned()),
            Self::ProtocolViolation(v) => ErrorCause::ProtocolViolation(v.into_owned()),
        }
    }
}

impl Framed for ErrorCause<'_> {
    const PREFIX_LEN: usize = TLV_HEADER_LEN;

    fn frame_len(prefix: &[u8]) -> Result<usize, ValidationError> {
        tlv_frame_len(prefix, LengthField::ErrorCause)
    }
}

impl_decode_owned!(ErrorCause);

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn invalid_stream_identifier() {
        let cause = ErrorCause::InvalidStreamIdentifier(20000);
        assert_eq!(cause.to_bytes(), [0, 1, 0, 8, 0x4e, 0x20, 0, 0]);
        assert_eq!(
            ErrorCause::from_bytes(&[0, 1, 0, 8, 0x4e, 0x20, 0xff, 0xff]),
            Ok(cause)
        );
        assert_eq!(
            ErrorCause::from_bytes(&[0, 1, 0, 6, 0x4e, 0x20, 0, 0]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::ErrorCause,
                length: 6
            })
        );
    }

    #[test]
    fn missing_mandatory_parameter_count() {
        let cause = ErrorCause::MissingMandatoryParameter(ParameterTypes::new(vec![7]).unwrap());
        let bytes = cause.to_bytes();
        assert_eq!(bytes, [0, 2, 0, 10, 0, 0, 0, 1, 0, 7, 0, 0]);
        assert_eq!(cause.unpadded_len(), 10);
        assert_eq!(ErrorCause::from_bytes(&bytes), Ok(cause));

        // Count says two, only one listed.
        assert_eq!(
            ErrorCause::from_bytes(&[0, 2, 0, 10, 0, 0, 0, 2, 0, 7, 0, 0]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::ErrorCause,
                length: 10
            })
        );
    }

    #[test]
    fn empty_causes_reject_values() {
        assert_eq!(
            ErrorCause::from_bytes(&[0, 10, 0, 4]),
            Ok(ErrorCause::CookieReceivedWhileShuttingDown)
        );
        assert!(ErrorCause::from_bytes(&[0, 4, 0, 8, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn opaque_causes_borrow() {
        let bytes = [0, 12, 0, 7, b'b', b'y', b'e', 0];
        let cause = ErrorCause::from_bytes(&bytes).unwrap();
        assert_eq!(cause.len(), 8);
        let ErrorCause::UserInitiatedAbort(reason) = cause.clone() else {
            panic!("expected User-Initiated Abort, got {:?}", cause);
        };
        assert!(matches!(reason.into_inner(), Cow::Borrowed(b) if b == b"bye"));

        let owned = ErrorCause::decode_owned(&bytes).unwrap();
        assert_eq!(owned, cause);
    }

    #[test]
    fn embedded_header_minimum() {
        assert_eq!(
            ErrorCause::from_bytes(&[0, 6, 0, 6, 0xff, 0, 0, 0]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::ErrorCause,
                length: 6
            })
        );
        let chunk = TlvValue::new(&[0xff, 0, 0, 4][..]).unwrap();
        assert!(ErrorCause::UnrecognizedChunkType(chunk).validate().is_ok());
        assert!(ErrorCause::UnrecognizedChunkType(TlvValue::default())
            .validate()
            .is_err());
    }

    #[test]
    fn unknown_cause_code() {
        assert_eq!(
            ErrorCause::from_bytes(&[0, 14, 0, 4]),
            Err(ValidationError::TypeInvalid {
                field: TypeField::ErrorCauseCode,
                value: 14
            })
        );
        assert_eq!(ErrorCause::frame_len(&[0, 13, 0, 5]), Ok(8));
    }
}
