// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The Stream Control Transmission Protocol (SCTP) layer.
//!
//! An SCTP packet is a 12-byte common header followed by one or more chunks:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-------------------------------+-------------------------------+
//! |      Source Port Number       |   Destination Port Number     |
//! +-------------------------------+-------------------------------+
//! |                      Verification Tag                         |
//! +---------------------------------------------------------------+
//! |                 Checksum (CRC32c, little-endian)              |
//! +---------------+---------------+-------------------------------+
//! |  Chunk Type   |  Chunk Flags  |         Chunk Length          |
//! +---------------+---------------+-------------------------------+
//! |                          Chunk Value                          |
//! +---------------------------------------------------------------+
//! ```
//!
//! Each chunk is padded to a multiple of 4 bytes. The padding of the final chunk is not counted
//! in its Chunk Length and may be omitted on the wire.

mod causes;
mod chunks;
mod params;

pub use causes::*;
pub use chunks::*;
pub use params::*;

pub use crate::layers::tlv::TlvValue;

use sigpkts_common::BufferWrite;

use crate::checksum;
use crate::error::{LengthField, TypeField, ValidationError};
use crate::layers::traits::*;
use crate::utils;

pub const CHUNK_TYPE_DATA: u8 = 0;
pub const CHUNK_TYPE_INIT: u8 = 1;
pub const CHUNK_TYPE_INIT_ACK: u8 = 2;
pub const CHUNK_TYPE_SACK: u8 = 3;
pub const CHUNK_TYPE_HEARTBEAT: u8 = 4;
pub const CHUNK_TYPE_HEARTBEAT_ACK: u8 = 5;
pub const CHUNK_TYPE_ABORT: u8 = 6;
pub const CHUNK_TYPE_SHUTDOWN: u8 = 7;
pub const CHUNK_TYPE_SHUTDOWN_ACK: u8 = 8;
pub const CHUNK_TYPE_ERROR: u8 = 9;
pub const CHUNK_TYPE_COOKIE_ECHO: u8 = 10;
pub const CHUNK_TYPE_COOKIE_ACK: u8 = 11;
pub const CHUNK_TYPE_SHUTDOWN_COMPLETE: u8 = 14;

/// Size of the Type, Flags and Length fields that begin every chunk.
pub const CHUNK_HEADER_LEN: usize = 4;

const SCTP_HEADER_LEN: usize = 12;

/// The framing of a single chunk, split off a buffer but not yet decoded.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChunkHeader<'a> {
    chunk_type: u8,
    flags: u8,
    length: usize,
    body: &'a [u8],
}

impl<'a> ChunkHeader<'a> {
    /// Splits the first chunk off `bytes`, returning it and the bytes following its padding.
    fn split(bytes: &'a [u8]) -> Result<(Self, &'a [u8]), ValidationError> {
        let (Some(&chunk_type), Some(&flags), Some(length)) = (
            bytes.first(),
            bytes.get(1),
            utils::get_array(bytes, 2).map(|&a| u16::from_be_bytes(a)),
        ) else {
            return Err(ValidationError::HeaderIncomplete {
                layer: "SCTP chunk",
                required: CHUNK_HEADER_LEN,
                available: bytes.len(),
            });
        };

        let length = length as usize;
        if length < CHUNK_HEADER_LEN || length > bytes.len() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length,
            });
        }

        let advance = utils::padded_length::<4>(length).min(bytes.len());
        Ok((
            Self {
                chunk_type,
                flags,
                length,
                body: &bytes[CHUNK_HEADER_LEN..length],
            },
            &bytes[advance..],
        ))
    }

    /// Frames a buffer that must contain exactly one chunk of type `chunk_type`.
    pub(crate) fn expect(bytes: &'a [u8], chunk_type: u8) -> Result<Self, ValidationError> {
        if let Some(&actual) = bytes.first() {
            if actual != chunk_type {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::ChunkType,
                    value: actual as u16,
                });
            }
        }

        let (header, rem) = Self::split(bytes)?;
        if !rem.is_empty() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: header.length,
            });
        }

        Ok(header)
    }

    #[inline]
    pub(crate) fn flags(&self) -> u8 {
        self.flags
    }

    /// The Chunk Length field.
    #[inline]
    pub(crate) fn length(&self) -> usize {
        self.length
    }

    /// The chunk value, excluding the header and any padding.
    #[inline]
    pub(crate) fn body(&self) -> &'a [u8] {
        self.body
    }
}

/// A single SCTP chunk of any supported type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk<'a> {
    Data(DataChunk<'a>),
    Init(InitChunk<'a>),
    InitAck(InitAckChunk<'a>),
    Sack(SackChunk),
    Heartbeat(HeartbeatChunk<'a>),
    HeartbeatAck(HeartbeatAckChunk<'a>),
    Abort(AbortChunk<'a>),
    Shutdown(ShutdownChunk),
    ShutdownAck(ShutdownAckChunk),
    Error(ErrorChunk<'a>),
    CookieEcho(CookieEchoChunk<'a>),
    CookieAck(CookieAckChunk),
    ShutdownComplete(ShutdownCompleteChunk),
}

impl<'a> Chunk<'a> {
    /// The Chunk Type field.
    pub fn chunk_type(&self) -> u8 {
        match self {
            Self::Data(_) => CHUNK_TYPE_DATA,
            Self::Init(_) => CHUNK_TYPE_INIT,
            Self::InitAck(_) => CHUNK_TYPE_INIT_ACK,
            Self::Sack(_) => CHUNK_TYPE_SACK,
            Self::Heartbeat(_) => CHUNK_TYPE_HEARTBEAT,
            Self::HeartbeatAck(_) => CHUNK_TYPE_HEARTBEAT_ACK,
            Self::Abort(_) => CHUNK_TYPE_ABORT,
            Self::Shutdown(_) => CHUNK_TYPE_SHUTDOWN,
            Self::ShutdownAck(_) => CHUNK_TYPE_SHUTDOWN_ACK,
            Self::Error(_) => CHUNK_TYPE_ERROR,
            Self::CookieEcho(_) => CHUNK_TYPE_COOKIE_ECHO,
            Self::CookieAck(_) => CHUNK_TYPE_COOKIE_ACK,
            Self::ShutdownComplete(_) => CHUNK_TYPE_SHUTDOWN_COMPLETE,
        }
    }

    /// The Chunk Length field, which excludes trailing padding.
    pub fn unpadded_len(&self) -> usize {
        match self {
            Self::Data(c) => c.unpadded_len(),
            Self::Init(c) => c.unpadded_len(),
            Self::InitAck(c) => c.unpadded_len(),
            Self::Sack(c) => c.unpadded_len(),
            Self::Heartbeat(c) => c.unpadded_len(),
            Self::HeartbeatAck(c) => c.unpadded_len(),
            Self::Abort(c) => c.unpadded_len(),
            Self::Shutdown(c) => c.unpadded_len(),
            Self::ShutdownAck(c) => c.unpadded_len(),
            Self::Error(c) => c.unpadded_len(),
            Self::CookieEcho(c) => c.unpadded_len(),
            Self::CookieAck(c) => c.unpadded_len(),
            Self::ShutdownComplete(c) => c.unpadded_len(),
        }
    }

    /// Whether the chunk must be the only chunk in its packet.
    #[inline]
    pub fn requires_own_packet(&self) -> bool {
        matches!(
            self,
            Self::Init(_) | Self::InitAck(_) | Self::ShutdownComplete(_)
        )
    }

    /// Splits the first chunk off `bytes`, returning it along with the bytes that follow it.
    pub fn split(bytes: &'a [u8]) -> Result<(Self, &'a [u8]), ValidationError> {
        let (header, rem) = ChunkHeader::split(bytes)?;
        let chunk = match header.chunk_type {
            CHUNK_TYPE_DATA => Self::Data(DataChunk::from_header(header)?),
            CHUNK_TYPE_INIT => Self::Init(InitChunk::from_header(header)?),
            CHUNK_TYPE_INIT_ACK => Self::InitAck(InitAckChunk::from_header(header)?),
            CHUNK_TYPE_SACK => Self::Sack(SackChunk::from_header(header)?),
            CHUNK_TYPE_HEARTBEAT => Self::Heartbeat(HeartbeatChunk::from_header(header)?),
            CHUNK_TYPE_HEARTBEAT_ACK => {
                Self::HeartbeatAck(HeartbeatAckChunk::from_header(header)?)
            }
            CHUNK_TYPE_ABORT => Self::Abort(AbortChunk::from_header(header)?),
            CHUNK_TYPE_SHUTDOWN => Self::Shutdown(ShutdownChunk::from_header(header)?),
            CHUNK_TYPE_SHUTDOWN_ACK => Self::ShutdownAck(ShutdownAckChunk::from_header(header)?),
            CHUNK_TYPE_ERROR => Self::Error(ErrorChunk::from_header(header)?),
            CHUNK_TYPE_COOKIE_ECHO => Self::CookieEcho(CookieEchoChunk::from_header(header)?),
            CHUNK_TYPE_COOKIE_ACK => Self::CookieAck(CookieAckChunk::from_header(header)?),
            CHUNK_TYPE_SHUTDOWN_COMPLETE => {
                Self::ShutdownComplete(ShutdownCompleteChunk::from_header(header)?)
            }
            unknown => {
                return Err(ValidationError::TypeInvalid {
                    field: TypeField::ChunkType,
                    value: unknown as u16,
                })
            }
        };

        Ok((chunk, rem))
    }
}

impl<'a> FromBytes<'a> for Chunk<'a> {
    fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        let (chunk, rem) = Self::split(bytes)?;
        if !rem.is_empty() {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: chunk.unpadded_len(),
            });
        }
        Ok(chunk)
    }
}

impl LayerLength for Chunk<'_> {
    #[inline]
    fn len(&self) -> usize {
        utils::padded_length::<4>(self.unpadded_len())
    }
}

impl ToBytes for Chunk<'_> {
    fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
        match self {
            Self::Data(c) => c.to_bytes_extended(bytes),
            Self::Init(c) => c.to_bytes_extended(bytes),
            Self::InitAck(c) => c.to_bytes_extended(bytes),
            Self::Sack(c) => c.to_bytes_extended(bytes),
            Self::Heartbeat(c) => c.to_bytes_extended(bytes),
            Self::HeartbeatAck(c) => c.to_bytes_extended(bytes),
            Self::Abort(c) => c.to_bytes_extended(bytes),
            Self::Shutdown(c) => c.to_bytes_extended(bytes),
            Self::ShutdownAck(c) => c.to_bytes_extended(bytes),
            Self::Error(c) => c.to_bytes_extended(bytes),
            Self::CookieEcho(c) => c.to_bytes_extended(bytes),
            Self::CookieAck(c) => c.to_bytes_extended(bytes),
            Self::ShutdownComplete(c) => c.to_bytes_extended(bytes),
        }
    }
}

impl IntoOwned for Chunk<'_> {
    type Owned = Chunk<'static>;

    fn into_owned(self) -> Self::Owned {
        match self {
            Self::Data(c) => Chunk::Data(c.into_owned()),
            Self::Init(c) => Chunk::Init(c.into_owned()),
            Self::InitAck(c) => Chunk::InitAck(c.into_owned()),
            Self::Sack(c) => Chunk::Sack(c),
            Self::Heartbeat(c) => Chunk::Heartbeat(c.into_owned()),
            Self::HeartbeatAck(c) => Chunk::HeartbeatAck(c.into_owned()),
            Self::Abort(c) => Chunk::Abort(c.into_owned()),
            Self::Shutdown(c) => Chunk::Shutdown(c),
            Self::ShutdownAck(c) => Chunk::ShutdownAck(c),
            Self::Error(c) => Chunk::Error(c.into_owned()),
            Self::CookieEcho(c) => Chunk::CookieEcho(c.into_owned()),
            Self::CookieAck(c) => Chunk::CookieAck(c),
            Self::ShutdownComplete(c) => Chunk::ShutdownComplete(c),
        }
    }
}

impl Framed for Chunk<'_> {
    const PREFIX_LEN: usize = CHUNK_HEADER_LEN;

    fn frame_len(prefix: &[u8]) -> Result<usize, ValidationError> {
        let Some(length) = utils::get_array(prefix, 2).map(|&a| u16::from_be_bytes(a)) else {
            return Err(ValidationError::HeaderIncomplete {
                layer: "SCTP chunk",
                required: CHUNK_HEADER_LEN,
                available: prefix.len(),
            });
        };

        let length = length as usize;
        if length < CHUNK_HEADER_LEN {
            return Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length,
            });
        }

        Ok(utils::padded_length::<4>(length))
    }
}

impl_decode_owned!(Chunk);

/// Lazily decodes the chunks of an SCTP packet.
///
/// Iteration ends after the first error is returned.
#[derive(Clone, Debug)]
pub struct ChunksIter<'a> {
    bytes: &'a [u8],
}

impl<'a> ChunksIter<'a> {
    /// Iterates over the chunks in `bytes`, which must begin at a chunk boundary.
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl<'a> Iterator for ChunksIter<'a> {
    type Item = Result<Chunk<'a>, ValidationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }

        match Chunk::split(self.bytes) {
            Ok((chunk, rem)) => {
                self.bytes = rem;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.bytes = &[];
                Some(Err(e))
            }
        }
    }
}

/// An SCTP packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sctp<'a> {
    sport: u16,
    dport: u16,
    verify_tag: u32,
    chunks: Vec<Chunk<'a>>,
}

impl<'a> Sctp<'a> {
    #[inline]
    pub fn new(sport: u16, dport: u16, verify_tag: u32, chunks: Vec<Chunk<'a>>) -> Self {
        Self {
            sport,
            dport,
            verify_tag,
            chunks,
        }
    }

    /// Validates the CRC32c checksum of a raw SCTP packet and returns an iterator over its
    /// chunks without decoding them up front.
    pub fn chunks_iter(bytes: &'a [u8]) -> Result<ChunksIter<'a>, ValidationError> {
        Self::verify_header(bytes)?;
        Ok(ChunksIter::new(&bytes[SCTP_HEADER_LEN..]))
    }

    #[inline]
    pub fn sport(&self) -> u16 {
        self.sport
    }

    #[inline]
    pub fn dport(&self) -> u16 {
        self.dport
    }

    #[inline]
    pub fn verify_tag(&self) -> u32 {
        self.verify_tag
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk<'a>] {
        &self.chunks
    }

    #[inline]
    pub fn chunks_mut(&mut self) -> &mut Vec<Chunk<'a>> {
        &mut self.chunks
    }

    /// The CRC32c checksum that would be written for this packet.
    pub fn chksum(&self) -> u32 {
        let bytes = self.to_bytes();
        checksum::sctp_crc32c(&bytes)
    }

    /// Checks that INIT, INIT ACK and SHUTDOWN COMPLETE chunks are not bundled with any other
    /// chunk.
    pub fn check_bundling(&self) -> Result<(), ValidationError> {
        if self.chunks.len() <= 1 {
            return Ok(());
        }

        match self.chunks.iter().find(|c| c.requires_own_packet()) {
            Some(chunk) => Err(ValidationError::BundlingInvalid {
                chunk_type: chunk.chunk_type(),
            }),
            None => Ok(()),
        }
    }

    fn verify_header(bytes: &[u8]) -> Result<(), ValidationError> {
        let Some(received) = utils::to_array(bytes, checksum::SCTP_CHECKSUM_OFFSET) else {
            return Err(ValidationError::HeaderIncomplete {
                layer: "SCTP",
                required: SCTP_HEADER_LEN,
                available: bytes.len(),
            });
        };

        let received = u32::from_le_bytes(received);
        let expected = checksum::sctp_crc32c(bytes);
        if received != expected {
            tracing::debug!(received, expected, "SCTP checksum mismatch");
            return Err(ValidationError::ChecksumInvalid {
                layer: "SCTP",
                received,
                expected,
            });
        }

        Ok(())
    }

    fn decode(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        Self::verify_header(bytes)?;
        let chunks = ChunksIter::new(&bytes[SCTP_HEADER_LEN..]).collect::<Result<Vec<_>, _>>()?;
        tracing::trace!(chunks = chunks.len(), "decoded SCTP packet");

        Ok(Self {
            sport: utils::be_u16(bytes, 0),
            dport: utils::be_u16(bytes, 2),
            verify_tag: utils::be_u32(bytes, 4),
            chunks,
        })
    }
}

impl<'a> FromBytes<'a> for Sctp<'a> {
    fn from_bytes(bytes: &'a [u8]) -> Result<Self, ValidationError> {
        Self::decode(bytes).map_err(|e| {
            tracing::debug!(error = %e, len = bytes.len(), "failed to decode SCTP packet");
            e
        })
    }
}

impl LayerLength for Sctp<'_> {
    #[inline]
    fn len(&self) -> usize {
        SCTP_HEADER_LEN + self.chunks.iter().map(|c| c.len()).sum::<usize>()
    }
}

impl ToBytes for Sctp<'_> {
    fn to_bytes_extended<B: BufferWrite>(&self, bytes: &mut B) {
        let start = bytes.len();
        bytes.append(&self.sport.to_be_bytes());
        bytes.append(&self.dport.to_be_bytes());
        bytes.append(&self.verify_tag.to_be_bytes());
        bytes.append(&[0; 4]);
        for chunk in &self.chunks {
            chunk.to_bytes_extended(bytes);
        }

        let offset = start + checksum::SCTP_CHECKSUM_OFFSET;
        let crc = checksum::sctp_crc32c(&bytes.as_mut_slice()[start..]);
        bytes.as_mut_slice()[offset..offset + 4].copy_from_slice(&crc.to_le_bytes());
    }
}

impl IntoOwned for Sctp<'_> {
    type Owned = Sctp<'static>;

    fn into_owned(self) -> Self::Owned {
        Sctp {
            sport: self.sport,
            dport: self.dport,
            verify_tag: self.verify_tag,
            chunks: self.chunks.into_iter().map(IntoOwned::into_owned).collect(),
        }
    }
}

impl_decode_owned!(Sctp);

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn cookie_ack_packet() -> Sctp<'static> {
        Sctp::new(
            5000,
            36412,
            0x11223344,
            vec![Chunk::CookieAck(CookieAckChunk::new())],
        )
    }

    #[test]
    fn cookie_ack_packet_layout() {
        let packet = cookie_ack_packet();
        let bytes = packet.to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &[0x13, 0x88, 0x8e, 0x3c, 0x11, 0x22, 0x33, 0x44]);
        assert_eq!(&bytes[12..], &[11, 0, 0, 4]);

        let crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        assert_eq!(crc, packet.chksum());
        assert_eq!(Sctp::from_bytes(&bytes), Ok(packet));
    }

    #[test]
    fn any_bit_flip_breaks_crc() {
        let bytes = cookie_ack_packet().to_bytes();
        for bit in 0..bytes.len() * 8 {
            let mut flipped = bytes.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            assert!(
                matches!(
                    Sctp::from_bytes(&flipped),
                    Err(ValidationError::ChecksumInvalid { layer: "SCTP", .. })
                ),
                "bit {} not detected",
                bit
            );
        }
    }

    #[test]
    fn truncated_header() {
        assert_eq!(
            Sctp::from_bytes(&[0; 11]),
            Err(ValidationError::HeaderIncomplete {
                layer: "SCTP",
                required: 12,
                available: 11
            })
        );
    }

    #[test]
    fn heartbeat_abort_bundle() {
        let packet = Sctp::new(
            1,
            2,
            3,
            vec![
                Chunk::Heartbeat(HeartbeatChunk::new(&[1, 2, 3, 4, 4, 3, 2, 1, 1, 2, 3, 4][..]).unwrap()),
                Chunk::Abort(
                    AbortChunk::new(
                        TagFlags::TAG_REFLECTED,
                        vec![
                            ErrorCause::CookieReceivedWhileShuttingDown,
                            ErrorCause::InvalidStreamIdentifier(20000),
                        ],
                    )
                    .unwrap(),
                ),
            ],
        );
        let bytes = packet.to_bytes();
        assert_eq!(bytes.len(), 12 + 20 + 16);
        assert_eq!(&bytes[12..16], &[4, 0, 0, 20]);
        assert_eq!(&bytes[32..36], &[6, 1, 0, 16]);

        let decoded = Sctp::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.chunks().len(), 2);
        assert_eq!(decoded, packet);
        assert_eq!(decoded.check_bundling(), Ok(()));
    }

    #[test]
    fn unknown_chunk_type() {
        let mut packet = cookie_ack_packet().to_bytes();
        packet[12] = 0x40;
        let crc = checksum::sctp_crc32c(&packet);
        packet[8..12].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(
            Sctp::from_bytes(&packet),
            Err(ValidationError::TypeInvalid {
                field: TypeField::ChunkType,
                value: 0x40
            })
        );
    }

    #[test]
    fn chunk_length_overruns_packet() {
        let mut packet = cookie_ack_packet().to_bytes();
        packet[15] = 8;
        let crc = checksum::sctp_crc32c(&packet);
        packet[8..12].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(
            Sctp::from_bytes(&packet),
            Err(ValidationError::LengthInvalid {
                field: LengthField::SctpChunk,
                length: 8
            })
        );
    }

    #[test]
    fn init_must_not_be_bundled() {
        let init = InitChunk::new(
            InitFields {
                init_tag: 1,
                a_rwnd: 1500,
                outbound_streams: 1,
                inbound_streams: 1,
                initial_tsn: 0,
            },
            Vec::new(),
        )
        .unwrap();
        let packet = Sctp::new(
            1,
            2,
            0,
            vec![Chunk::Init(init), Chunk::CookieAck(CookieAckChunk::new())],
        );
        assert_eq!(
            packet.check_bundling(),
            Err(ValidationError::BundlingInvalid {
                chunk_type: CHUNK_TYPE_INIT
            })
        );
    }

    #[test]
    fn lazy_iteration_stops_on_error() {
        let mut bytes = cookie_ack_packet().to_bytes();
        bytes.extend_from_slice(&[0x41, 0, 0, 4]);
        let crc = checksum::sctp_crc32c(&bytes);
        bytes[8..12].copy_from_slice(&crc.to_le_bytes());

        let mut iter = Sctp::chunks_iter(&bytes).unwrap();
        assert!(matches!(iter.next(), Some(Ok(Chunk::CookieAck(_)))));
        assert!(matches!(iter.next(), Some(Err(_))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn owned_packet_from_transient_buffer() {
        let owned = {
            let bytes = Sctp::new(
                9,
                9,
                9,
                vec![Chunk::CookieEcho(
                    CookieEchoChunk::new(Cow::Owned(vec![0xaa; 5])).unwrap(),
                )],
            )
            .to_bytes();
            Sctp::decode_owned(&bytes).unwrap()
        };

        match &owned.chunks()[0] {
            Chunk::CookieEcho(c) => assert_eq!(c.cookie(), &[0xaa; 5]),
            other => panic!("unexpected chunk {:?}", other),
        }
    }

    #[test]
    fn chunk_frame_len() {
        assert_eq!(Chunk::frame_len(&[4, 0, 0, 21]), Ok(24));
        assert!(Chunk::frame_len(&[4, 0, 0, 3]).is_err());
        assert_eq!(
            Chunk::from_bytes(&[11, 0, 0, 4]),
            Ok(Chunk::CookieAck(CookieAckChunk::new()))
        );
    }
}
