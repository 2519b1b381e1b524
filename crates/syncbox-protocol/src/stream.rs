//! Chunking a byte payload into packets and folding packets back into bytes.
//!
//! [`serialize`] and [`deserialize`] are not exact inverses: the last
//! packet is zero-padded and [`deserialize`] keeps that padding, so the
//! buffer it returns is always a multiple of [`PACKET_DATA_SIZE`]. Callers
//! that need the original length use a self-delimiting payload, which is
//! what [`frame`](crate::frame) provides for envelopes.

use crate::constants::PACKET_DATA_SIZE;
use crate::error::{ProtocolError, Result};
use crate::packet::Packet;

/// Splits `payload` into an ordered packet sequence.
///
/// Packet `i` carries bytes `[i * 1024, min((i + 1) * 1024, len))` and every
/// packet records the total count as its size. Index order is transmission
/// order.
///
/// # Errors
/// - [`ProtocolError::EmptyPayload`] if `payload` is empty.
/// - [`ProtocolError::AddressOverflow`] if the payload needs more than
///   `u32::MAX` packets.
pub fn serialize(payload: &[u8]) -> Result<Vec<Packet>> {
    if payload.is_empty() {
        return Err(ProtocolError::EmptyPayload);
    }

    let count = payload.len().div_ceil(PACKET_DATA_SIZE);
    let size = count as u64;
    // Every sequence index is below `size`, so this one check covers them all.
    if size > u64::from(u32::MAX) {
        return Err(ProtocolError::AddressOverflow(size));
    }

    payload
        .chunks(PACKET_DATA_SIZE)
        .enumerate()
        .map(|(sequence, chunk)| {
            let mut data = [0u8; PACKET_DATA_SIZE];
            data[..chunk.len()].copy_from_slice(chunk);
            Packet::new(size, sequence as u64, data)
        })
        .collect()
}

/// Concatenates the data blocks of `packets` in the order given.
///
/// No sorting, no sequence checks and no trimming: the result is exactly
/// `packets.len() * 1024` bytes, padding included.
pub fn deserialize(packets: &[Packet]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(packets.len() * PACKET_DATA_SIZE);
    for packet in packets {
        buffer.extend_from_slice(packet.data());
    }
    buffer
}

/// Checks that `packets` form one complete message in transmission order:
/// every packet agrees on the size, the size equals the number of packets,
/// and each sequence number matches its index.
///
/// # Errors
/// Returns [`ProtocolError::OutOfSequence`] naming the first offending
/// packet, or [`ProtocolError::EmptyPayload`] for an empty slice.
pub fn validate_sequence(packets: &[Packet]) -> Result<()> {
    if packets.is_empty() {
        return Err(ProtocolError::EmptyPayload);
    }

    let expected = packets.len();
    for (index, packet) in packets.iter().enumerate() {
        let size = packet.size();
        let sequence = packet.sequence();
        if size as usize != expected || sequence as usize != index {
            return Err(ProtocolError::OutOfSequence {
                index,
                size,
                sequence,
                expected,
            });
        }
    }
    Ok(())
}
