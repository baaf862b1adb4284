// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The individual SCTP chunk types.
//!
//! Each chunk type can be decoded on its own with [`FromBytes::from_bytes()`], in which case
//! the chunk type octet must match, or as part of a [`Chunk`](super::Chunk) sequence.

use std::borrow::Cow;

use bitflags::bitflags;
use sigpkts_common::BufferWrite;

use crate::error::{LengthField, TypeField, ValidationError};
use crate::layers::tlv::{self, TlvIter};
use crate::layers::traits::*;
use crate::utils;

use super::causes::ErrorCause;
use super::params::*;
use super::*;

const CHUNK_LENGTH_MAX: usize = u16::MAX as usize;

/// Implements the framing traits shared by every chunk type.
macro_rules! chunk_traits {
    ($name:ident<$lt:lifetime>, $chunk_type:expr) => {
        impl<$lt> FromBytes<$lt> for $name<$lt> {
            fn from_bytes(bytes: &$lt [u8]) -> Result<Self, ValidationError> {
                Self::from_header(ChunkHeader::expect(bytes, $chunk_type)?)
            }
        }

        impl LayerLength for $name<'_> {
            #[inline]
            fn len(&self) -> usize {
                utils::padded_length::<4>(self.unpadded_len())
            }
        }

        impl ToBytes for $name<'_> {
            #[inline]
            fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
                self.write(bytes);
            }
        }
    };
    ($name:ident, $chunk_type:expr) => {
        impl<'a> FromBytes<'a> for $name {
            fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError> {
                Self::from_header(ChunkHeader::expect(bytes, $chunk_type)?)
            }
        }

        impl LayerLength for $name {
            #[inline]
            fn len(&self) -> usize {
                utils::padded_length::<4>(self.unpadded_len())
            }
        }

        impl ToBytes for $name {
            #[inline]
            fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
                self.write(bytes);
            }
        }
    };
}

#[inline]
fn chunk_length_invalid(length: usize) -> ValidationError {
    ValidationError::LengthInvalid {
        field: LengthField::SctpChunk,
        length,
    }
}

fn check_chunk_len(unpadded_len: usize) -> Result<(), ValidationError> {
    if unpadded_len > CHUNK_LENGTH_MAX {
        Err(chunk_length_invalid(unpadded_len))
    } else {
        Ok(())
    }
}

/// Writes a chunk header followed by a body, backfilling the Length field from the unpadded
/// end offset returned by `write_body` and padding the chunk to a multiple of 4 bytes.
fn write_chunk<B: BufferWrite, F: FnOnce(&mut B) -> usize>(
    bytes: &mut B,
    chunk_type: u8,
    flags: u8,
    write_body: F,
) {
    let start = bytes.len();
    bytes.push(chunk_type);
    bytes.push(flags);
    bytes.append(&[0, 0]);
    let end = write_body(bytes);
    debug_assert!(end - start <= CHUNK_LENGTH_MAX);
    utils::backfill_u16(bytes, start + 2, (end - start) as u16);
    utils::pad_to_4(bytes, start);
}

fn write_params<B: BufferWrite>(bytes: &mut B, params: &[ChunkParameter<'_>]) -> usize {
    params.iter().fold(bytes.len(), |_, p| p.write(bytes))
}

fn write_causes<B: BufferWrite>(bytes: &mut B, causes: &[ErrorCause<'_>]) -> usize {
    causes.iter().fold(bytes.len(), |_, c| c.write(bytes))
}

fn decode_params<'a>(body: &'a [u8]) -> Result<Vec<ChunkParameter<'a>>, ValidationError> {
    TlvIter::new(body, LengthField::ChunkParameter)
        .map(|tlv| tlv.and_then(ChunkParameter::from_tlv))
        .collect()
}

fn decode_causes<'a>(body: &'a [u8]) -> Result<Vec<ErrorCause<'a>>, ValidationError> {
    TlvIter::new(body, LengthField::ErrorCause)
        .map(|tlv| tlv.and_then(ErrorCause::from_tlv))
        .collect()
}

fn params_len(params: &[ChunkParameter<'_>]) -> usize {
    tlv::sequence_unpadded_len(params.iter().map(ChunkParameter::unpadded_len))
}

fn causes_len(causes: &[ErrorCause<'_>]) -> usize {
    tlv::sequence_unpadded_len(causes.iter().map(ErrorCause::unpadded_len))
}

fn owned_bytes(v: Cow<'_, [u8]>) -> Cow<'static, [u8]> {
    Cow::Owned(v.into_owned())
}

bitflags! {
    /// Flags of a DATA chunk.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DataChunkFlags: u8 {
        /// The receiver should acknowledge this chunk without delay (RFC 7053).
        const IMMEDIATE = 0b1000;
        const UNORDERED = 0b0100;
        /// First fragment of a user message.
        const BEGINNING = 0b0010;
        /// Last fragment of a user message.
        const ENDING = 0b0001;
    }
}

bitflags! {
    /// Flags of the ABORT and SHUTDOWN COMPLETE chunks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TagFlags: u8 {
        /// The Verification Tag is the one the sender expected to receive, not its own.
        const TAG_REFLECTED = 0b1;
    }
}

// DATA

const DATA_HEADER_LEN: usize = 16;

/// A DATA chunk carrying a fragment of a user message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataChunk<'a> {
    flags: DataChunkFlags,
    tsn: u32,
    stream_id: u16,
    stream_seq: u16,
    proto_id: u32,
    data: Cow<'a, [u8]>,
}

impl<'a> DataChunk<'a> {
    /// Builds a DATA chunk. `data` must hold at least one byte.
    pub fn new(
        flags: DataChunkFlags,
        tsn: u32,
        stream_id: u16,
        stream_seq: u16,
        proto_id: u32,
        data: impl Into<Cow<'a, [u8]>>,
    ) -> Result<Self, ValidationError> {
        let chunk = Self {
            flags,
            tsn,
            stream_id,
            stream_seq,
            proto_id,
            data: data.into(),
        };
        if chunk.data.is_empty() {
            return Err(chunk_length_invalid(DATA_HEADER_LEN));
        }
        check_chunk_len(chunk.unpadded_len())?;
        Ok(chunk)
    }

    #[inline]
    pub fn flags(&self) -> DataChunkFlags {
        self.flags
    }

    /// The Transmission Sequence Number.
    #[inline]
    pub fn tsn(&self) -> u32 {
        self.tsn
    }

    #[inline]
    pub fn stream_id(&self) -> u16 {
        self.stream_id
    }

    #[inline]
    pub fn stream_seq(&self) -> u16 {
        self.stream_seq
    }

    /// The Payload Protocol Identifier.
    #[inline]
    pub fn proto_id(&self) -> u32 {
        self.proto_id
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        DATA_HEADER_LEN + self.data.len()
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        let body = header.body();
        if body.len() <= DATA_HEADER_LEN - CHUNK_HEADER_LEN {
            return Err(chunk_length_invalid(header.length()));
        }

        Ok(Self {
            flags: DataChunkFlags::from_bits_retain(header.flags()),
            tsn: utils::be_u32(body, 0),
            stream_id: utils::be_u16(body, 4),
            stream_seq: utils::be_u16(body, 6),
            proto_id: utils::be_u32(body, 8),
            data: Cow::Borrowed(&body[12..]),
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_DATA, self.flags.bits(), |bytes| {
            bytes.append(&self.tsn.to_be_bytes());
            bytes.append(&self.stream_id.to_be_bytes());
            bytes.append(&self.stream_seq.to_be_bytes());
            bytes.append(&self.proto_id.to_be_bytes());
            bytes.append(&self.data);
            bytes.len()
        })
    }
}

impl IntoOwned for DataChunk<'_> {
    type Owned = DataChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        DataChunk {
            flags: self.flags,
            tsn: self.tsn,
            stream_id: self.stream_id,
            stream_seq: self.stream_seq,
            proto_id: self.proto_id,
            data: owned_bytes(self.data),
        }
    }
}

chunk_traits!(DataChunk<'a>, CHUNK_TYPE_DATA);

// INIT and INIT ACK

const INIT_HEADER_LEN: usize = 20;

/// The fixed fields shared by INIT and INIT ACK chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitFields {
    pub init_tag: u32,
    /// Advertised Receiver Window Credit.
    pub a_rwnd: u32,
    pub outbound_streams: u16,
    pub inbound_streams: u16,
    pub initial_tsn: u32,
}

impl InitFields {
    fn decode(body: &[u8]) -> Self {
        Self {
            init_tag: utils::be_u32(body, 0),
            a_rwnd: utils::be_u32(body, 4),
            outbound_streams: utils::be_u16(body, 8),
            inbound_streams: utils::be_u16(body, 10),
            initial_tsn: utils::be_u32(body, 12),
        }
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        bytes.append(&self.init_tag.to_be_bytes());
        bytes.append(&self.a_rwnd.to_be_bytes());
        bytes.append(&self.outbound_streams.to_be_bytes());
        bytes.append(&self.inbound_streams.to_be_bytes());
        bytes.append(&self.initial_tsn.to_be_bytes());
    }
}

fn init_allowed(param: &ChunkParameter<'_>) -> bool {
    matches!(
        param,
        ChunkParameter::Ipv4Address(_)
            | ChunkParameter::Ipv6Address(_)
            | ChunkParameter::CookiePreservative(_)
            | ChunkParameter::HostName(_)
            | ChunkParameter::SupportedAddressTypes(_)
            | ChunkParameter::EcnCapable
            | ChunkParameter::ForwardTsnSupported
    )
}

fn init_ack_allowed(param: &ChunkParameter<'_>) -> bool {
    matches!(
        param,
        ChunkParameter::StateCookie(_)
            | ChunkParameter::Ipv4Address(_)
            | ChunkParameter::Ipv6Address(_)
            | ChunkParameter::UnrecognizedParameter(_)
            | ChunkParameter::HostName(_)
            | ChunkParameter::EcnCapable
            | ChunkParameter::ForwardTsnSupported
    )
}

fn check_init_params(
    params: &[ChunkParameter<'_>],
    allowed: fn(&ChunkParameter<'_>) -> bool,
) -> Result<(), ValidationError> {
    for param in params {
        if !allowed(param) {
            return Err(ValidationError::TypeInvalid {
                field: TypeField::ParameterType,
                value: param.parameter_type(),
            });
        }
    }
    Ok(())
}

fn decode_init<'a>(
    header: &ChunkHeader<'a>,
    allowed: fn(&ChunkParameter<'_>) -> bool,
) -> Result<(InitFields, Vec<ChunkParameter<'a>>), ValidationError> {
    let body = header.body();
    if body.len() < INIT_HEADER_LEN - CHUNK_HEADER_LEN {
        return Err(chunk_length_invalid(header.length()));
    }

    let params = decode_params(&body[INIT_HEADER_LEN - CHUNK_HEADER_LEN..])?;
    check_init_params(&params, allowed)?;
    Ok((InitFields::decode(body), params))
}

/// An INIT chunk, which opens an association.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitChunk<'a> {
    flags: u8,
    fields: InitFields,
    params: Vec<ChunkParameter<'a>>,
}

impl<'a> InitChunk<'a> {
    /// Builds an INIT chunk. Only address, Cookie Preservative, Host Name, Supported Address
    /// Types, ECN Capable and Forward-TSN-Supported parameters may be included.
    pub fn new(
        fields: InitFields,
        params: Vec<ChunkParameter<'a>>,
    ) -> Result<Self, ValidationError> {
        check_init_params(&params, init_allowed)?;
        params.iter().try_for_each(ChunkParameter::validate)?;
        let chunk = Self {
            flags: 0,
            fields,
            params,
        };
        check_chunk_len(chunk.unpadded_len())?;
        Ok(chunk)
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn fields(&self) -> &InitFields {
        &self.fields
    }

    #[inline]
    pub fn params(&self) -> &[ChunkParameter<'a>] {
        &self.params
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        INIT_HEADER_LEN + params_len(&self.params)
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        let (fields, params) = decode_init(&header, init_allowed)?;
        Ok(Self {
            flags: header.flags(),
            fields,
            params,
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_INIT, self.flags, |bytes| {
            self.fields.write(bytes);
            write_params(bytes, &self.params)
        })
    }
}

impl IntoOwned for InitChunk<'_> {
    type Owned = InitChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        InitChunk {
            flags: self.flags,
            fields: self.fields,
            params: self.params.into_iter().map(IntoOwned::into_owned).collect(),
        }
    }
}

chunk_traits!(InitChunk<'a>, CHUNK_TYPE_INIT);

/// An INIT ACK chunk, which answers an INIT and must carry a State Cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitAckChunk<'a> {
    flags: u8,
    fields: InitFields,
    params: Vec<ChunkParameter<'a>>,
}

impl<'a> InitAckChunk<'a> {
    /// Builds an INIT ACK chunk. `params` must include a State Cookie, and may otherwise only
    /// hold address, Unrecognized Parameter, Host Name, ECN Capable and Forward-TSN-Supported
    /// parameters.
    pub fn new(
        fields: InitFields,
        params: Vec<ChunkParameter<'a>>,
    ) -> Result<Self, ValidationError> {
        check_init_params(&params, init_ack_allowed)?;
        Self::check_state_cookie(&params)?;
        params.iter().try_for_each(ChunkParameter::validate)?;
        let chunk = Self {
            flags: 0,
            fields,
            params,
        };
        check_chunk_len(chunk.unpadded_len())?;
        Ok(chunk)
    }

    fn check_state_cookie(params: &[ChunkParameter<'_>]) -> Result<(), ValidationError> {
        if params
            .iter()
            .any(|p| matches!(p, ChunkParameter::StateCookie(_)))
        {
            Ok(())
        } else {
            Err(ValidationError::RequiredFieldMissing {
                chunk_type: CHUNK_TYPE_INIT_ACK,
                parameter_type: PARAM_TYPE_STATE_COOKIE,
            })
        }
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn fields(&self) -> &InitFields {
        &self.fields
    }

    #[inline]
    pub fn params(&self) -> &[ChunkParameter<'a>] {
        &self.params
    }

    /// The contents of the (first) State Cookie parameter.
    pub fn state_cookie(&self) -> &[u8] {
        self.params
            .iter()
            .find_map(|p| match p {
                ChunkParameter::StateCookie(cookie) => Some(&cookie[..]),
                _ => None,
            })
            .unwrap_or_default()
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        INIT_HEADER_LEN + params_len(&self.params)
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        let (fields, params) = decode_init(&header, init_ack_allowed)?;
        Self::check_state_cookie(&params)?;
        Ok(Self {
            flags: header.flags(),
            fields,
            params,
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_INIT_ACK, self.flags, |bytes| {
            self.fields.write(bytes);
            write_params(bytes, &self.params)
        })
    }
}

impl IntoOwned for InitAckChunk<'_> {
    type Owned = InitAckChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        InitAckChunk {
            flags: self.flags,
            fields: self.fields,
            params: self.params.into_iter().map(IntoOwned::into_owned).collect(),
        }
    }
}

chunk_traits!(InitAckChunk<'a>, CHUNK_TYPE_INIT_ACK);

// SACK

const SACK_HEADER_LEN: usize = 16;

/// A Gap Ack Block, with offsets relative to the Cumulative TSN Ack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapAckBlock {
    pub start: u16,
    pub end: u16,
}

/// A Selective Acknowledgement chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SackChunk {
    flags: u8,
    cum_tsn_ack: u32,
    a_rwnd: u32,
    gap_blocks: Vec<GapAckBlock>,
    duplicate_tsns: Vec<u32>,
}

impl SackChunk {
    pub fn new(
        cum_tsn_ack: u32,
        a_rwnd: u32,
        gap_blocks: Vec<GapAckBlock>,
        duplicate_tsns: Vec<u32>,
    ) -> Result<Self, ValidationError> {
        let chunk = Self {
            flags: 0,
            cum_tsn_ack,
            a_rwnd,
            gap_blocks,
            duplicate_tsns,
        };
        // Bounding the chunk length also bounds both 16-bit counts.
        check_chunk_len(chunk.unpadded_len())?;
        Ok(chunk)
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn cum_tsn_ack(&self) -> u32 {
        self.cum_tsn_ack
    }

    #[inline]
    pub fn a_rwnd(&self) -> u32 {
        self.a_rwnd
    }

    #[inline]
    pub fn gap_blocks(&self) -> &[GapAckBlock] {
        &self.gap_blocks
    }

    #[inline]
    pub fn duplicate_tsns(&self) -> &[u32] {
        &self.duplicate_tsns
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        SACK_HEADER_LEN + 4 * (self.gap_blocks.len() + self.duplicate_tsns.len())
    }

    pub(crate) fn from_header(header: ChunkHeader<'_>) -> Result<Self, ValidationError> {
        let body = header.body();
        if body.len() < SACK_HEADER_LEN - CHUNK_HEADER_LEN {
            return Err(chunk_length_invalid(header.length()));
        }

        let gaps = utils::be_u16(body, 8) as usize;
        let dups = utils::be_u16(body, 10) as usize;
        if header.length() != SACK_HEADER_LEN + 4 * (gaps + dups) {
            return Err(chunk_length_invalid(header.length()));
        }

        let (gap_bytes, dup_bytes) = body[12..].split_at(4 * gaps);
        Ok(Self {
            flags: header.flags(),
            cum_tsn_ack: utils::be_u32(body, 0),
            a_rwnd: utils::be_u32(body, 4),
            gap_blocks: gap_bytes
                .chunks_exact(4)
                .map(|b| GapAckBlock {
                    start: utils::be_u16(b, 0),
                    end: utils::be_u16(b, 2),
                })
                .collect(),
            duplicate_tsns: dup_bytes.chunks_exact(4).map(|b| utils::be_u32(b, 0)).collect(),
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_SACK, self.flags, |bytes| {
            bytes.append(&self.cum_tsn_ack.to_be_bytes());
            bytes.append(&self.a_rwnd.to_be_bytes());
            bytes.append(&(self.gap_blocks.len() as u16).to_be_bytes());
            bytes.append(&(self.duplicate_tsns.len() as u16).to_be_bytes());
            for block in &self.gap_blocks {
                bytes.append(&block.start.to_be_bytes());
                bytes.append(&block.end.to_be_bytes());
            }
            for tsn in &self.duplicate_tsns {
                bytes.append(&tsn.to_be_bytes());
            }
            bytes.len()
        })
    }
}

impl IntoOwned for SackChunk {
    type Owned = SackChunk;

    #[inline]
    fn into_owned(self) -> Self::Owned {
        self
    }
}

chunk_traits!(SackChunk, CHUNK_TYPE_SACK);

// HEARTBEAT and HEARTBEAT ACK

fn decode_heartbeat_info<'a>(
    chunk_type: u8,
    header: &ChunkHeader<'a>,
) -> Result<Cow<'a, [u8]>, ValidationError> {
    let mut params = TlvIter::new(header.body(), LengthField::ChunkParameter);
    let info = match params.next() {
        None => {
            return Err(ValidationError::RequiredFieldMissing {
                chunk_type,
                parameter_type: PARAM_TYPE_HEARTBEAT_INFO,
            })
        }
        Some(tlv) => match ChunkParameter::from_tlv(tlv?)? {
            ChunkParameter::HeartbeatInfo(info) => info.into_inner(),
            other => {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::ParameterType,
                    value: other.parameter_type(),
                })
            }
        },
    };

    if params.next().is_some() {
        return Err(chunk_length_invalid(header.length()));
    }

    Ok(info)
}

fn check_heartbeat_info(info: &[u8]) -> Result<(), ValidationError> {
    check_chunk_len(CHUNK_HEADER_LEN + tlv::TLV_HEADER_LEN + info.len())
}

fn write_heartbeat<B: BufferWrite>(bytes: &mut B, chunk_type: u8, flags: u8, info: &[u8]) {
    write_chunk(bytes, chunk_type, flags, |bytes| {
        tlv::write_tlv(bytes, PARAM_TYPE_HEARTBEAT_INFO, |bytes| bytes.append(info))
    })
}

/// A HEARTBEAT request carrying exactly one Heartbeat Info parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeartbeatChunk<'a> {
    flags: u8,
    info: Cow<'a, [u8]>,
}

impl<'a> HeartbeatChunk<'a> {
    pub fn new(info: impl Into<Cow<'a, [u8]>>) -> Result<Self, ValidationError> {
        let info = info.into();
        check_heartbeat_info(&info)?;
        Ok(Self { flags: 0, info })
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// The sender-specific Heartbeat Information.
    #[inline]
    pub fn info(&self) -> &[u8] {
        &self.info
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        CHUNK_HEADER_LEN + tlv::TLV_HEADER_LEN + self.info.len()
    }

    /// The HEARTBEAT ACK that echoes this request.
    pub fn to_ack(&self) -> HeartbeatAckChunk<'a> {
        HeartbeatAckChunk {
            flags: 0,
            info: self.info.clone(),
        }
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        Ok(Self {
            flags: header.flags(),
            info: decode_heartbeat_info(CHUNK_TYPE_HEARTBEAT, &header)?,
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_heartbeat(bytes, CHUNK_TYPE_HEARTBEAT, self.flags, &self.info)
    }
}

impl IntoOwned for HeartbeatChunk<'_> {
    type Owned = HeartbeatChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        HeartbeatChunk {
            flags: self.flags,
            info: owned_bytes(self.info),
        }
    }
}

chunk_traits!(HeartbeatChunk<'a>, CHUNK_TYPE_HEARTBEAT);

/// A HEARTBEAT ACK echoing the Heartbeat Info of a HEARTBEAT request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeartbeatAckChunk<'a> {
    flags: u8,
    info: Cow<'a, [u8]>,
}

impl<'a> HeartbeatAckChunk<'a> {
    pub fn new(info: impl Into<Cow<'a, [u8]>>) -> Result<Self, ValidationError> {
        let info = info.into();
        check_heartbeat_info(&info)?;
        Ok(Self { flags: 0, info })
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn info(&self) -> &[u8] {
        &self.info
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        CHUNK_HEADER_LEN + tlv::TLV_HEADER_LEN + self.info.len()
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        Ok(Self {
            flags: header.flags(),
            info: decode_heartbeat_info(CHUNK_TYPE_HEARTBEAT_ACK, &header)?,
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_heartbeat(bytes, CHUNK_TYPE_HEARTBEAT_ACK, self.flags, &self.info)
    }
}

impl IntoOwned for HeartbeatAckChunk<'_> {
    type Owned = HeartbeatAckChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        HeartbeatAckChunk {
            flags: self.flags,
            info: owned_bytes(self.info),
        }
    }
}

chunk_traits!(HeartbeatAckChunk<'a>, CHUNK_TYPE_HEARTBEAT_ACK);

// ABORT and ERROR

fn check_causes(causes: &[ErrorCause<'_>]) -> Result<(), ValidationError> {
    causes.iter().try_for_each(ErrorCause::validate)?;
    check_chunk_len(CHUNK_HEADER_LEN + causes_len(causes))
}

/// An ABORT chunk, which closes an association immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbortChunk<'a> {
    flags: TagFlags,
    causes: Vec<ErrorCause<'a>>,
}

impl<'a> AbortChunk<'a> {
    pub fn new(flags: TagFlags, causes: Vec<ErrorCause<'a>>) -> Result<Self, ValidationError> {
        check_causes(&causes)?;
        Ok(Self { flags, causes })
    }

    #[inline]
    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    #[inline]
    pub fn causes(&self) -> &[ErrorCause<'a>] {
        &self.causes
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        CHUNK_HEADER_LEN + causes_len(&self.causes)
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        Ok(Self {
            flags: TagFlags::from_bits_retain(header.flags()),
            causes: decode_causes(header.body())?,
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_ABORT, self.flags.bits(), |bytes| {
            write_causes(bytes, &self.causes)
        })
    }
}

impl IntoOwned for AbortChunk<'_> {
    type Owned = AbortChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        AbortChunk {
            flags: self.flags,
            causes: self.causes.into_iter().map(IntoOwned::into_owned).collect(),
        }
    }
}

chunk_traits!(AbortChunk<'a>, CHUNK_TYPE_ABORT);

/// An Operation Error chunk, reporting non-fatal error conditions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorChunk<'a> {
    flags: u8,
    causes: Vec<ErrorCause<'a>>,
}

impl<'a> ErrorChunk<'a> {
    pub fn new(causes: Vec<ErrorCause<'a>>) -> Result<Self, ValidationError> {
        check_causes(&causes)?;
        Ok(Self { flags: 0, causes })
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn causes(&self) -> &[ErrorCause<'a>] {
        &self.causes
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        CHUNK_HEADER_LEN + causes_len(&self.causes)
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        Ok(Self {
            flags: header.flags(),
            causes: decode_causes(header.body())?,
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_ERROR, self.flags, |bytes| {
            write_causes(bytes, &self.causes)
        })
    }
}

impl IntoOwned for ErrorChunk<'_> {
    type Owned = ErrorChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        ErrorChunk {
            flags: self.flags,
            causes: self.causes.into_iter().map(IntoOwned::into_owned).collect(),
        }
    }
}

chunk_traits!(ErrorChunk<'a>, CHUNK_TYPE_ERROR);

// SHUTDOWN

const SHUTDOWN_LEN: usize = 8;

/// A SHUTDOWN chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownChunk {
    flags: u8,
    cum_tsn_ack: u32,
}

impl ShutdownChunk {
    #[inline]
    pub fn new(cum_tsn_ack: u32) -> Self {
        Self {
            flags: 0,
            cum_tsn_ack,
        }
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn cum_tsn_ack(&self) -> u32 {
        self.cum_tsn_ack
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        SHUTDOWN_LEN
    }

    pub(crate) fn from_header(header: ChunkHeader<'_>) -> Result<Self, ValidationError> {
        if header.length() != SHUTDOWN_LEN {
            return Err(chunk_length_invalid(header.length()));
        }

        Ok(Self {
            flags: header.flags(),
            cum_tsn_ack: utils::be_u32(header.body(), 0),
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_SHUTDOWN, self.flags, |bytes| {
            bytes.append(&self.cum_tsn_ack.to_be_bytes());
            bytes.len()
        })
    }
}

chunk_traits!(ShutdownChunk, CHUNK_TYPE_SHUTDOWN);

// COOKIE ECHO

/// A COOKIE ECHO chunk returning the State Cookie from an INIT ACK.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieEchoChunk<'a> {
    flags: u8,
    cookie: Cow<'a, [u8]>,
}

impl<'a> CookieEchoChunk<'a> {
    pub fn new(cookie: impl Into<Cow<'a, [u8]>>) -> Result<Self, ValidationError> {
        let chunk = Self {
            flags: 0,
            cookie: cookie.into(),
        };
        check_chunk_len(chunk.unpadded_len())?;
        Ok(chunk)
    }

    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn cookie(&self) -> &[u8] {
        &self.cookie
    }

    #[inline]
    pub fn unpadded_len(&self) -> usize {
        CHUNK_HEADER_LEN + self.cookie.len()
    }

    pub(crate) fn from_header(header: ChunkHeader<'a>) -> Result<Self, ValidationError> {
        Ok(Self {
            flags: header.flags(),
            cookie: Cow::Borrowed(header.body()),
        })
    }

    fn write<B: BufferWrite>(&self, bytes: &mut B) {
        write_chunk(bytes, CHUNK_TYPE_COOKIE_ECHO, self.flags, |bytes| {
            bytes.append(&self.cookie);
            bytes.len()
        })
    }
}

impl IntoOwned for CookieEchoChunk<'_> {
    type Owned = CookieEchoChunk<'static>;

    fn into_owned(self) -> Self::Owned {
        CookieEchoChunk {
            flags: self.flags,
            cookie: owned_bytes(self.cookie),
        }
    }
}

chunk_traits!(CookieEchoChunk<'a>, CHUNK_TYPE_COOKIE_ECHO);

// Header-only chunks

/// Declares a chunk type that consists of nothing but its 4-byte header.
macro_rules! header_only_chunk {
    ($(#[$meta:meta])* $name:ident, $flags:ty, $chunk_type:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            flags: $flags,
        }

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self::default()
            }

            #[inline]
            pub fn unpadded_len(&self) -> usize {
                CHUNK_HEADER_LEN
            }

            pub(crate) fn from_header(header: ChunkHeader<'_>) -> Result<Self, ValidationError> {
                if header.length() != CHUNK_HEADER_LEN {
                    return Err(chunk_length_invalid(header.length()));
                }

                Ok(Self {
                    flags: <$flags>::from_octet(header.flags()),
                })
            }

            fn write<B: BufferWrite>(&self, bytes: &mut B) {
                write_chunk(bytes, $chunk_type, self.flags.octet(), |bytes| bytes.len())
            }
        }

        chunk_traits!($name, $chunk_type);
    };
}

/// Conversion between a chunk's flags octet and its typed representation.
trait FlagsOctet: Copy {
    fn from_octet(octet: u8) -> Self;

    fn octet(self) -> u8;
}

impl FlagsOctet for u8 {
    #[inline]
    fn from_octet(octet: u8) -> Self {
        octet
    }

    #[inline]
    fn octet(self) -> u8 {
        self
    }
}

impl FlagsOctet for TagFlags {
    #[inline]
    fn from_octet(octet: u8) -> Self {
        TagFlags::from_bits_retain(octet)
    }

    #[inline]
    fn octet(self) -> u8 {
        self.bits()
    }
}

header_only_chunk!(
    /// A SHUTDOWN ACK chunk.
    ShutdownAckChunk,
    u8,
    CHUNK_TYPE_SHUTDOWN_ACK
);

header_only_chunk!(
    /// A COOKIE ACK chunk.
    CookieAckChunk,
    u8,
    CHUNK_TYPE_COOKIE_ACK
);

header_only_chunk!(
    /// A SHUTDOWN COMPLETE chunk.
    ShutdownCompleteChunk,
    TagFlags,
    CHUNK_TYPE_SHUTDOWN_COMPLETE
);

impl ShutdownAckChunk {
    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }
}

impl CookieAckChunk {
    /// The raw chunk flags; all bits are reserved.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }
}

impl ShutdownCompleteChunk {
    #[inline]
    pub fn with_flags(flags: TagFlags) -> Self {
        Self { flags }
    }

    #[inline]
    pub fn flags(&self) -> TagFlags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use crate::layers::tlv::TlvValue;

    #[test]
    fn cookie_ack() {
        let chunk = CookieAckChunk::new();
        assert_eq!(chunk.to_bytes(), [11, 0, 0, 4]);
        assert_eq!(CookieAckChunk::from_bytes(&[11, 0, 0, 4]), Ok(chunk));
        assert_eq!(
            CookieAckChunk::from_bytes(&[11, 0, 0, 8, 0, 0, 0, 0]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: 8
            })
        );
    }

    #[test]
    fn tag_mismatch() {
        assert_eq!(
            CookieAckChunk::from_bytes(&[14, 0, 0, 4]),
            Err(ValidationError::TypeInvalid {
                field: TypeField::ChunkType,
                value: 14
            })
        );
    }

    #[test]
    fn shutdown_fixed_length() {
        let chunk = ShutdownChunk::new(0x01020304);
        assert_eq!(chunk.to_bytes(), [7, 0, 0, 8, 1, 2, 3, 4]);
        assert_eq!(
            ShutdownChunk::from_bytes(&[7, 0, 0, 12, 1, 2, 3, 4, 0, 0, 0, 0]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: 12
            })
        );
    }

    #[test]
    fn header_only_chunks_reject_other_lengths() {
        assert_eq!(
            CookieAckChunk::from_bytes(&[11, 0, 0, 5, 0, 0, 0, 0]),
            Err(chunk_length_invalid(5))
        );
        assert_eq!(
            ShutdownAckChunk::from_bytes(&[8, 0, 0, 5, 0, 0, 0, 0]),
            Err(chunk_length_invalid(5))
        );
        assert_eq!(
            ShutdownAckChunk::from_bytes(&[8, 0, 0, 8, 0, 0, 0, 0]),
            Err(chunk_length_invalid(8))
        );
        assert_eq!(
            ShutdownCompleteChunk::from_bytes(&[14, 1, 0, 8, 0, 0, 0, 0]),
            Err(chunk_length_invalid(8))
        );
        assert_eq!(
            ShutdownCompleteChunk::from_bytes(&[14, 0, 0, 6, 0, 0, 0, 0]),
            Err(chunk_length_invalid(6))
        );
        assert_eq!(
            Chunk::from_bytes(&[14, 0, 0, 8, 0, 0, 0, 0]).map(|_| ()),
            Err(chunk_length_invalid(8))
        );
    }

    #[test]
    fn shutdown_complete_reflected_tag() {
        let chunk = ShutdownCompleteChunk::from_bytes(&[14, 1, 0, 4]).unwrap();
        assert!(chunk.flags().contains(TagFlags::TAG_REFLECTED));
        assert_eq!(chunk.to_bytes(), [14, 1, 0, 4]);
    }

    #[test]
    fn heartbeat() {
        let info = [1, 2, 3, 4, 4, 3, 2, 1, 1, 2, 3, 4];
        let chunk = HeartbeatChunk::new(&info[..]).unwrap();
        assert_eq!(chunk.unpadded_len(), 20);
        let bytes = chunk.to_bytes();
        assert_eq!(&bytes[..8], &[4, 0, 0, 20, 0, 1, 0, 16]);
        assert_eq!(&bytes[8..], &info);

        let decoded = HeartbeatChunk::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.info(), &info);
        assert_eq!(decoded, chunk);

        let ack = chunk.to_ack();
        assert_eq!(ack.to_bytes()[0], CHUNK_TYPE_HEARTBEAT_ACK);
    }

    #[test]
    fn heartbeat_requires_single_info() {
        assert_eq!(
            HeartbeatChunk::from_bytes(&[4, 0, 0, 4]),
            Err(ValidationError::RequiredFieldMissing {
                chunk_type: CHUNK_TYPE_HEARTBEAT,
                parameter_type: PARAM_TYPE_HEARTBEAT_INFO
            })
        );
        assert_eq!(
            HeartbeatChunk::from_bytes(&[4, 0, 0, 12, 0, 7, 0, 8, 1, 2, 3, 4]),
            Err(ValidationError::TypeInvalid {
                field: TypeField::ParameterType,
                value: PARAM_TYPE_STATE_COOKIE
            })
        );
        assert_eq!(
            HeartbeatAckChunk::from_bytes(&[5, 0, 0, 12, 0, 1, 0, 4, 0, 1, 0, 4]),
            Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: 12
            })
        );
    }

    #[test]
    fn abort_with_causes() {
        let chunk = AbortChunk::new(
            TagFlags::empty(),
            vec![
                ErrorCause::CookieReceivedWhileShuttingDown,
                ErrorCause::InvalidStreamIdentifier(20000),
            ],
        )
        .unwrap();
        assert_eq!(chunk.unpadded_len(), 16);
        let bytes = chunk.to_bytes();
        assert_eq!(
            bytes,
            [6, 0, 0, 16, 0, 10, 0, 4, 0, 1, 0, 8, 0x4e, 0x20, 0, 0]
        );
        assert_eq!(AbortChunk::from_bytes(&bytes), Ok(chunk));
    }

    #[test]
    fn abort_rejects_unknown_cause() {
        assert_eq!(
            AbortChunk::from_bytes(&[6, 0, 0, 8, 0, 99, 0, 4]),
            Err(ValidationError::TypeInvalid {
                field: TypeField::ErrorCauseCode,
                value: 99
            })
        );
    }

    #[test]
    fn error_chunk_last_cause_unpadded() {
        let chunk = ErrorChunk::new(vec![
            ErrorCause::MissingMandatoryParameter(ParameterTypes::new(vec![7]).unwrap()),
            ErrorCause::UserInitiatedAbort(TlvValue::new(&b"x"[..]).unwrap()),
        ])
        .unwrap();
        // 12 (padded) + 5 (unpadded) + 4 header
        assert_eq!(chunk.unpadded_len(), 21);
        assert_eq!(chunk.len(), 24);
        let bytes = chunk.to_bytes();
        assert_eq!(&bytes[..4], &[9, 0, 0, 21]);
        assert_eq!(ErrorChunk::from_bytes(&bytes), Ok(chunk.clone()));
        // Trailing padding may also be omitted entirely.
        assert_eq!(ErrorChunk::from_bytes(&bytes[..21]), Ok(chunk));
    }

    #[test]
    fn data_chunk() {
        let chunk = DataChunk::new(
            DataChunkFlags::BEGINNING | DataChunkFlags::ENDING,
            1,
            2,
            3,
            46,
            &b"hello"[..],
        )
        .unwrap();
        let bytes = chunk.to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[..4], &[0, 3, 0, 21]);
        assert_eq!(DataChunk::from_bytes(&bytes), Ok(chunk));
        assert!(DataChunk::from_bytes(&[0, 3, 0, 12, 0, 0, 0, 1, 0, 2, 0, 3]).is_err());

        // No user data.
        let empty = [0, 3, 0, 16, 0, 0, 0, 1, 0, 2, 0, 3, 0, 0, 0, 46];
        assert_eq!(
            DataChunk::from_bytes(&empty),
            Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: 16
            })
        );
        assert!(DataChunk::new(DataChunkFlags::empty(), 1, 2, 3, 46, Vec::<u8>::new()).is_err());
    }

    #[test]
    fn sack_counts_match_length() {
        let chunk = SackChunk::new(
            100,
            65535,
            vec![GapAckBlock { start: 2, end: 3 }],
            vec![99],
        )
        .unwrap();
        let bytes = chunk.to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[..4], &[3, 0, 0, 24]);
        assert_eq!(SackChunk::from_bytes(&bytes), Ok(chunk));

        let mut short = bytes.clone();
        short[13] = 2;
        assert_eq!(
            SackChunk::from_bytes(&short),
            Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: 24
            })
        );
    }

    fn init_fields() -> InitFields {
        InitFields {
            init_tag: 0xdeadbeef,
            a_rwnd: 106496,
            outbound_streams: 10,
            inbound_streams: 65535,
            initial_tsn: 1,
        }
    }

    #[test]
    fn init_parameters() {
        let chunk = InitChunk::new(
            init_fields(),
            vec![
                ChunkParameter::Ipv4Address(Ipv4Addr::new(10, 0, 0, 1)),
                ChunkParameter::SupportedAddressTypes(
                    ParameterTypes::new(vec![PARAM_TYPE_IPV4_ADDRESS]).unwrap(),
                ),
            ],
        )
        .unwrap();
        assert_eq!(chunk.unpadded_len(), 20 + 8 + 6);
        let bytes = chunk.to_bytes();
        assert_eq!(bytes.len(), 36);
        assert_eq!(InitChunk::from_bytes(&bytes), Ok(chunk));

        assert_eq!(
            InitChunk::new(
                init_fields(),
                vec![ChunkParameter::StateCookie(TlvValue::new(&[1u8][..]).unwrap())]
            ),
            Err(ValidationError::TypeInvalid {
                field: TypeField::ParameterType,
                value: PARAM_TYPE_STATE_COOKIE
            })
        );
    }

    #[test]
    fn init_ack_requires_cookie() {
        assert_eq!(
            InitAckChunk::new(init_fields(), vec![ChunkParameter::EcnCapable]),
            Err(ValidationError::RequiredFieldMissing {
                chunk_type: CHUNK_TYPE_INIT_ACK,
                parameter_type: PARAM_TYPE_STATE_COOKIE
            })
        );

        let chunk = InitAckChunk::new(
            init_fields(),
            vec![ChunkParameter::StateCookie(TlvValue::new(&b"cookie"[..]).unwrap())],
        )
        .unwrap();
        let mut bytes = chunk.to_bytes();
        assert_eq!(InitAckChunk::from_bytes(&bytes).unwrap().state_cookie(), b"cookie");

        // Rewriting the cookie as Host Name leaves no State Cookie.
        bytes[21] = PARAM_TYPE_HOST_NAME as u8;
        assert_eq!(
            InitAckChunk::from_bytes(&bytes),
            Err(ValidationError::RequiredFieldMissing {
                chunk_type: CHUNK_TYPE_INIT_ACK,
                parameter_type: PARAM_TYPE_STATE_COOKIE
            })
        );
    }

    #[test]
    fn owned_chunks_outlive_buffer() {
        let owned = {
            let bytes = vec![10, 0, 0, 7, 1, 2, 3, 0];
            CookieEchoChunk::from_bytes(&bytes).unwrap().into_owned()
        };
        assert_eq!(owned.cookie(), &[1, 2, 3]);
        assert_eq!(owned.to_bytes(), [10, 0, 0, 7, 1, 2, 3, 0]);
    }
}
