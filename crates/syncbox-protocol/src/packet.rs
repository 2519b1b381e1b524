//! The fixed-size packet record.
//!
//! Every message on the wire is cut into packets of exactly
//! [`PACKET_TOTAL_SIZE`] bytes:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────────────────────┐
//! │ size (4, LE) │ seq (4, LE)  │ data (1024, zero-padded)     │
//! └──────────────┴──────────────┴──────────────────────────────┘
//!   0              4              8                         1032
//! ```
//!
//! `size` is the number of packets in the enclosing message, not a byte
//! count. Because the record length never changes, a reader can pull
//! packets off a stream with plain fixed-size reads.

use std::fmt;

use crate::constants::{PACKET_ADDR_SIZE, PACKET_DATA_SIZE, PACKET_TOTAL_SIZE};
use crate::error::{ProtocolError, Result};

/// One chunk of a message plus its position and the total chunk count.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    size: [u8; PACKET_ADDR_SIZE],
    sequence: [u8; PACKET_ADDR_SIZE],
    data: [u8; PACKET_DATA_SIZE],
}

impl Packet {
    /// Builds a packet from its three fields.
    ///
    /// # Errors
    /// Returns [`ProtocolError::AddressOverflow`] if `size` or `sequence`
    /// exceeds `u32::MAX`.
    pub fn new(size: u64, sequence: u64, data: [u8; PACKET_DATA_SIZE]) -> Result<Self> {
        let mut packet = Self {
            size: [0; PACKET_ADDR_SIZE],
            sequence: [0; PACKET_ADDR_SIZE],
            data,
        };
        packet.set_size(size)?;
        packet.set_sequence(sequence)?;
        Ok(packet)
    }

    /// Rebuilds a packet from its on-wire form. Exact inverse of
    /// [`to_bytes`](Self::to_bytes); the fields are not validated.
    pub fn from_bytes(record: &[u8; PACKET_TOTAL_SIZE]) -> Self {
        let mut packet = Self {
            size: [0; PACKET_ADDR_SIZE],
            sequence: [0; PACKET_ADDR_SIZE],
            data: [0; PACKET_DATA_SIZE],
        };
        packet.size.copy_from_slice(&record[..PACKET_ADDR_SIZE]);
        packet
            .sequence
            .copy_from_slice(&record[PACKET_ADDR_SIZE..2 * PACKET_ADDR_SIZE]);
        packet.data.copy_from_slice(&record[2 * PACKET_ADDR_SIZE..]);
        packet
    }

    /// Serializes the packet into its exact on-wire layout.
    pub fn to_bytes(&self) -> [u8; PACKET_TOTAL_SIZE] {
        let mut record = [0u8; PACKET_TOTAL_SIZE];
        record[..PACKET_ADDR_SIZE].copy_from_slice(&self.size);
        record[PACKET_ADDR_SIZE..2 * PACKET_ADDR_SIZE].copy_from_slice(&self.sequence);
        record[2 * PACKET_ADDR_SIZE..].copy_from_slice(&self.data);
        record
    }

    /// Stores the total packet count of the enclosing message.
    ///
    /// # Errors
    /// Returns [`ProtocolError::AddressOverflow`] if `size > u32::MAX`.
    pub fn set_size(&mut self, size: u64) -> Result<()> {
        self.size = encode_address(size)?;
        Ok(())
    }

    /// Total packet count of the enclosing message.
    pub fn size(&self) -> u32 {
        u32::from_le_bytes(self.size)
    }

    /// Stores this packet's zero-based position in its message.
    ///
    /// # Errors
    /// Returns [`ProtocolError::AddressOverflow`] if `sequence > u32::MAX`.
    pub fn set_sequence(&mut self, sequence: u64) -> Result<()> {
        self.sequence = encode_address(sequence)?;
        Ok(())
    }

    /// Zero-based position of this packet in its message.
    pub fn sequence(&self) -> u32 {
        u32::from_le_bytes(self.sequence)
    }

    /// The fixed-width data block, including any zero padding.
    pub fn data(&self) -> &[u8; PACKET_DATA_SIZE] {
        &self.data
    }
}

fn encode_address(value: u64) -> Result<[u8; PACKET_ADDR_SIZE]> {
    let value = u32::try_from(value).map_err(|_| ProtocolError::AddressOverflow(value))?;
    Ok(value.to_le_bytes())
}

impl TryFrom<&[u8]> for Packet {
    type Error = ProtocolError;

    /// Rebuilds a packet from a slice that must be exactly one record long.
    fn try_from(record: &[u8]) -> Result<Self> {
        let record: &[u8; PACKET_TOTAL_SIZE] = record.try_into().map_err(|_| {
            ProtocolError::DecodeFailure(format!(
                "packet record must be {PACKET_TOTAL_SIZE} bytes, got {}",
                record.len()
            ))
        })?;
        Ok(Self::from_bytes(record))
    }
}

// The data block is 1 KiB; print its length instead of its bytes.
impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.size())
            .field("sequence", &self.sequence())
            .field("data", &format_args!("[u8; {PACKET_DATA_SIZE}]"))
            .finish()
    }
}
