// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Packet framing over `async-std` byte streams.

use ::async_std::io::{Read, ReadExt, Write, WriteExt};

use sigpkts::layers::traits::{DecodeOwned, Framed, ToBytes};

use crate::StreamError;

/// Reads a single self-delimiting entity from `reader`.
///
/// Cancelling the returned future discards any bytes already consumed from `reader`.
pub async fn read_framed<T, R>(reader: &mut R) -> Result<T, StreamError>
where
    T: Framed + DecodeOwned,
    R: Read + Unpin,
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
    R: Read + Unpin,
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
    W: Write + Unpin,
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

    use ::async_std::io::Cursor;
    use ::async_std::task;
    use sigpkts::layers::icmp::Icmp;
    use sigpkts::layers::ip::Ipv4;

    #[test]
    fn datagram_round_trip() {
        task::block_on(async {
            let datagram = echo_datagram();
            let mut stream = Cursor::new(Vec::new());
            write_packet(&mut stream, &datagram).await.unwrap();

            stream.set_position(0);
            let received: Ipv4<'static> = read_framed(&mut stream).await.unwrap();
            assert_eq!(received, datagram);

            let payload = received.payload().to_vec();
            let icmp: Icmp<'static> =
                read_sized(&mut payload.as_slice(), payload.len()).await.unwrap();
            assert_eq!(icmp.message_type(), 8);
        });
    }
}
