// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Packet framing over `tokio` byte streams.

use ::tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use sigpkts::layers::traits::{DecodeOwned, Framed, ToBytes};

use crate::StreamError;

/// Reads a single self-delimiting entity from `reader`.
///
/// Cancelling the returned future discards any bytes already consumed from `reader`.
pub async fn read_framed<T, R>(reader: &mut R) -> Result<T, StreamError>
where
    T: Framed + DecodeOwned,
    R: AsyncRead + Unpin,
{
    let mut frame = vec![0; T::PREFIX_LEN];
    reader.read_exact(&mut frame).await?;
    let len = crate::frame_len::<T>(&frame)?;
    frame.resize(len, 0);
    reader.read_exact(&mut frame[T::PREFIX_LEN..]).await?;
    crate::decode(&frame)
}

/// Reads exactly `len` bytes from `reader` and decodes them as a single entity.
pub async fn read_sized<T, R>(reader: &mut R, len: usize) -> Result<T, StreamError>
where
    T: DecodeOwned,
    R: AsyncRead + Unpin,
{
    crate::check_len(len)?;
    let mut frame = vec![0; len];
    reader.read_exact(&mut frame).await?;
    crate::decode(&frame)
}

/// Encodes `packet` and writes it to `writer` in full.
pub async fn write_packet<T, W>(writer: &mut W, packet: &T) -> Result<(), StreamError>
where
    T: ToBytes,
    W: AsyncWrite + Unpin,
{
    let bytes = packet.to_bytes();
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    tracing::trace!(len = bytes.len(), "wrote packet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::echo_datagram;

    use sigpkts::error::ValidationError;
    use sigpkts::layers::ip::Ipv4;
    use sigpkts::layers::sctp::{ChunkParameter, ErrorCause, Sctp};
    use sigpkts::layers::traits::LayerLength;

    #[tokio::test]
    async fn datagram_through_duplex() {
        let (mut client, mut server) = ::tokio::io::duplex(256);
        let datagram = echo_datagram();

        write_packet(&mut client, &datagram).await.unwrap();
        let received: Ipv4<'static> = read_framed(&mut server).await.unwrap();
        assert_eq!(received, datagram);
    }

    #[tokio::test]
    async fn decoded_value_outlives_buffer() {
        let param = {
            let bytes = vec![0, 7, 0, 9, b'c', b'o', b'o', b'k', b'y', 0, 0, 0];
            let mut reader = bytes.as_slice();
            read_framed::<ChunkParameter<'static>, _>(&mut reader).await.unwrap()
        };

        let handle = ::tokio::spawn(async move { param.len() });
        assert_eq!(handle.await.unwrap(), 12);
    }

    #[tokio::test]
    async fn truncated_stream() {
        let bytes = ErrorCause::NoUserData(7).to_bytes();
        let mut reader = &bytes[..6];
        let res = read_framed::<ErrorCause<'static>, _>(&mut reader).await;
        assert!(matches!(res, Err(StreamError::Io(_))));
    }

    #[tokio::test]
    async fn sized_packet_checksum() {
        let mut bytes = Sctp::new(1, 2, 3, Vec::new()).to_bytes();
        bytes[0] ^= 0x80;
        let res = read_sized::<Sctp<'static>, _>(&mut bytes.as_slice(), 12).await;
        assert!(matches!(
            res,
            Err(StreamError::Validation(ValidationError::ChecksumInvalid { .. }))
        ));
    }
}
