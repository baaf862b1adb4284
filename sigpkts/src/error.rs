// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors produced while decoding, constructing or serializing packets.

use core::fmt;

use thiserror::Error;

/// The reason a packet (or a value destined to become a packet) failed validation.
///
/// Every decode path in this crate fails on the first violated invariant and reports it through
/// one of these variants. Each variant carries enough context to build a diagnostic without
/// re-parsing the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The checksum recomputed over the packet did not match the one on the wire.
    #[error("{layer} checksum invalid (received {received:#x}, computed {expected:#x})")]
    ChecksumInvalid {
        layer: &'static str,
        received: u32,
        expected: u32,
    },
    /// The buffer ended before a header (or a length it declares) was complete.
    #[error("{layer} header incomplete ({required} bytes required, {available} available)")]
    HeaderIncomplete {
        layer: &'static str,
        required: usize,
        available: usize,
    },
    /// A length field disagrees with the layout expected for its structure.
    #[error("invalid {field} length {length}")]
    LengthInvalid { field: LengthField, length: usize },
    /// A type, tag or code field holds a value that is unknown or not permitted here.
    #[error("invalid {field} {value:#x}")]
    TypeInvalid { field: TypeField, value: u16 },
    /// A chunk that requires a particular parameter did not contain it.
    #[error("SCTP chunk type {chunk_type} missing required parameter type {parameter_type}")]
    RequiredFieldMissing { chunk_type: u8, parameter_type: u16 },
    /// A value passed to a constructor does not fit the width of its wire field.
    #[error("{field} value {value:#x} out of range")]
    ValueOutOfRange { field: &'static str, value: u32 },
    /// A chunk that must be sent alone was bundled with other chunks.
    #[error("SCTP chunk type {chunk_type} bundled with other chunks")]
    BundlingInvalid { chunk_type: u8 },
}

/// The structure whose length field was found to be invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthField {
    /// The IPv4 Internet Header Length, or the total size of the IPv4 options.
    Ipv4Header,
    /// The IPv4 Total Length field.
    Ipv4TotalLength,
    /// The length octet of a single IPv4 option.
    Ipv4Option,
    /// The size of an ICMP message.
    IcmpMessage,
    /// The length field of an SCTP chunk.
    SctpChunk,
    /// The length field of an SCTP chunk parameter.
    ChunkParameter,
    /// The length field of an SCTP error cause.
    ErrorCause,
}

impl fmt::Display for LengthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ipv4Header => "IPv4 header",
            Self::Ipv4TotalLength => "IPv4 total",
            Self::Ipv4Option => "IPv4 option",
            Self::IcmpMessage => "ICMP message",
            Self::SctpChunk => "SCTP chunk",
            Self::ChunkParameter => "SCTP chunk parameter",
            Self::ErrorCause => "SCTP error cause",
        })
    }
}

/// The tag or type field that held an unexpected value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeField {
    IpVersion,
    IpProtocol,
    Ipv4OptionType,
    /// The flag nibble of an Internet Timestamp option.
    TimestampFlag,
    IcmpType,
    /// The code of an ICMP message of the given type.
    IcmpCode { message_type: u8 },
    ChunkType,
    ParameterType,
    ErrorCauseCode,
}

impl fmt::Display for TypeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpVersion => f.write_str("IP version"),
            Self::IpProtocol => f.write_str("IP protocol"),
            Self::Ipv4OptionType => f.write_str("IPv4 option type"),
            Self::TimestampFlag => f.write_str("IPv4 timestamp flag"),
            Self::IcmpType => f.write_str("ICMP type"),
            Self::IcmpCode { message_type } => write!(f, "ICMP type {} code", message_type),
            Self::ChunkType => f.write_str("SCTP chunk type"),
            Self::ParameterType => f.write_str("SCTP parameter type"),
            Self::ErrorCauseCode => f.write_str("SCTP error cause code"),
        }
    }
}

/// An error returned when a packet cannot be written into a caller-supplied buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SerializationError {
    #[error("insufficient buffer space ({required} bytes required, {available} available)")]
    InsufficientBuffer { required: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_offending_values() {
        let err = ValidationError::ChecksumInvalid {
            layer: "ICMP",
            received: 0xbeef,
            expected: 0x1234,
        };
        assert_eq!(
            err.to_string(),
            "ICMP checksum invalid (received 0xbeef, computed 0x1234)"
        );

        let err = ValidationError::TypeInvalid {
            field: TypeField::IcmpCode { message_type: 3 },
            value: 16,
        };
        assert_eq!(err.to_string(), "invalid ICMP type 3 code 0x10");

        let err = ValidationError::LengthInvalid {
            field: LengthField::SctpChunk,
            length: 5,
        };
        assert_eq!(err.to_string(), "invalid SCTP chunk length 5");
    }
}
