//! Command ring snapshot types
//!
//! Rings are snapshotted read-only at capture time; the recovery core
//! never touches ring contents after that.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a command ring on the device (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RingId(pub u32);

impl fmt::Display for RingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ring{}", self.0)
    }
}

/// Point-in-time copy of one command ring
///
/// `data` holds the full ring contents, one dword per entry; offsets in
/// the rendered dump step by 4 bytes accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSnapshot {
    pub id: RingId,
    /// Ring name (e.g., "gfx", "sdma0")
    pub name: String,
    /// Read pointer at capture time
    pub rptr: u64,
    /// Write pointer at capture time
    pub wptr: u64,
    /// Ring buffer mask
    pub mask: u32,
    /// Full ring contents, one dword per entry
    pub data: Vec<u32>,
}

impl RingSnapshot {
    /// Ring size in dwords
    pub fn size_dwords(&self) -> usize {
        self.data.len()
    }

    /// Ring size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len() * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_id_display() {
        assert_eq!(RingId(3).to_string(), "ring3");
    }

    #[test]
    fn test_ring_sizes() {
        let ring = RingSnapshot {
            id: RingId(0),
            name: "gfx".to_string(),
            rptr: 0,
            wptr: 8,
            mask: 0xff,
            data: vec![0xdeadbeef; 16],
        };
        assert_eq!(ring.size_dwords(), 16);
        assert_eq!(ring.size_bytes(), 64);
    }
}
