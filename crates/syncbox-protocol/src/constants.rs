//! Shared protocol vocabulary.
//!
//! Every value here is part of the wire contract. Peers written against a
//! different implementation only interoperate if these match byte for byte.

use std::fmt;

// ---------------------------------------------------------------------------
// Stream roles
// ---------------------------------------------------------------------------

/// First byte of every framed request.
pub const REQUEST_PREFIX: u8 = b'q';

/// First byte of every framed response.
pub const RESPONSE_PREFIX: u8 = b's';

/// Reserved byte that terminates one envelope inside a frame.
pub const BYTE_DELIM: u8 = 4;

// ---------------------------------------------------------------------------
// Packet geometry
// ---------------------------------------------------------------------------

/// Payload bytes carried by a single packet.
pub const PACKET_DATA_SIZE: usize = 1024;

/// Width of the `size` and `sequence` address fields.
///
/// Four bytes bound a message at `u32::MAX` packets, roughly 4 TiB of
/// payload.
pub const PACKET_ADDR_SIZE: usize = 4;

/// Total on-wire length of one packet record.
pub const PACKET_TOTAL_SIZE: usize = 2 * PACKET_ADDR_SIZE + PACKET_DATA_SIZE;

// ---------------------------------------------------------------------------
// Data type tags
// ---------------------------------------------------------------------------

pub const TYPE_IDENTITY: &str = "IDENTITY";
pub const TYPE_DIGEST: &str = "DIGEST";
pub const TYPE_SYNC_REQUEST: &str = "SYNC-REQUEST";
pub const TYPE_FILE: &str = "FILE";

// ---------------------------------------------------------------------------
// Status codes and messages
// ---------------------------------------------------------------------------

pub const STATUS_OK: i64 = 200;
pub const STATUS_BAD: i64 = 400;

pub const MESSAGE_ACCEPT: &str = "ACCEPT";
pub const MESSAGE_DENY: &str = "DENY";

/// Identity the server presents during the handshake. Clients may not
/// claim it.
pub const SERVER_USERNAME: &str = "SYNCBOX-SERVER";

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which side of an exchange a framed envelope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Client → server traffic, prefixed with [`REQUEST_PREFIX`].
    Request,
    /// Server → client traffic, prefixed with [`RESPONSE_PREFIX`].
    Response,
}

impl Role {
    /// The prefix byte written ahead of an envelope of this role.
    pub fn prefix(self) -> u8 {
        match self {
            Role::Request => REQUEST_PREFIX,
            Role::Response => RESPONSE_PREFIX,
        }
    }

    /// Maps a prefix byte back to its role.
    pub fn from_prefix(byte: u8) -> Option<Self> {
        match byte {
            REQUEST_PREFIX => Some(Role::Request),
            RESPONSE_PREFIX => Some(Role::Response),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Request => f.write_str("request"),
            Role::Response => f.write_str("response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_total_size_is_1032() {
        assert_eq!(PACKET_TOTAL_SIZE, 1032);
    }

    #[test]
    fn test_role_prefix_round_trip() {
        for role in [Role::Request, Role::Response] {
            assert_eq!(Role::from_prefix(role.prefix()), Some(role));
        }
    }

    #[test]
    fn test_role_prefix_values() {
        assert_eq!(Role::Request.prefix(), b'q');
        assert_eq!(Role::Response.prefix(), b's');
    }

    #[test]
    fn test_unknown_prefix_has_no_role() {
        assert_eq!(Role::from_prefix(b'x'), None);
        assert_eq!(Role::from_prefix(BYTE_DELIM), None);
    }
}
