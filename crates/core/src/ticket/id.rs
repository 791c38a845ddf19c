//! Ticket identifier codec.
//!
//! A ticket identifier is 18 bytes in one of two layouts:
//!
//! ```text
//! random     : [0..18]  OS randomness
//! sequential : [0..4]   sequence number, u32 big-endian
//!              [4..8]   low 32 bits of the unix time in seconds
//!              [8..18]  OS randomness
//! ```
//!
//! The sequential layout is produced by writing the full u64 timestamp over
//! bytes 0..8 and then the sequence number over bytes 0..4, so the high half
//! of the timestamp is always overwritten.
//!
//! The canonical string form is `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`:
//! lowercase hex of byte groups 4, 2, 2, 2 and 6.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;

use super::TicketError;

/// Raw identifier length in bytes.
pub const TICKET_ID_LEN: usize = 18;

/// Length of the canonical string form.
pub const TICKET_STR_LEN: usize = 36;

/// Byte ranges rendered in the canonical string, in order. Only bytes 0..16
/// are rendered; bytes 16..18 are generated but never appear in the string.
const GROUPS: [(usize, usize); 5] = [(0, 4), (4, 6), (6, 8), (8, 10), (10, 16)];

/// An 18-byte ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketId([u8; TICKET_ID_LEN]);

impl TicketId {
    /// Creates an identifier from 18 bytes of OS randomness.
    pub fn random() -> Self {
        let mut bytes = [0u8; TICKET_ID_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Creates an identifier in the sequential layout.
    pub fn sequential(sequence: u32, unix_secs: u64) -> Self {
        let mut bytes = [0u8; TICKET_ID_LEN];
        bytes[..8].copy_from_slice(&unix_secs.to_be_bytes());
        bytes[..4].copy_from_slice(&sequence.to_be_bytes());
        OsRng.fill_bytes(&mut bytes[8..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; TICKET_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TICKET_ID_LEN] {
        &self.0
    }

    /// Sequence number held in bytes 0..4.
    pub fn sequence(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Low 32 bits of the generation timestamp held in bytes 4..8.
    pub fn timestamp_low(&self) -> u32 {
        u32::from_be_bytes([self.0[4], self.0[5], self.0[6], self.0[7]])
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(start, end)) in GROUPS.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            for byte in &self.0[start..end] {
                write!(f, "{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

impl FromStr for TicketId {
    type Err = TicketError;

    /// Parses the canonical form. Bytes beyond the rendered groups are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TicketError::MalformedId(s.to_string());

        let parts: Vec<&str> = s.split('-').collect();
        if s.len() != TICKET_STR_LEN || parts.len() != GROUPS.len() {
            return Err(malformed());
        }

        let mut bytes = [0u8; TICKET_ID_LEN];
        for (part, &(start, end)) in parts.iter().zip(GROUPS.iter()) {
            if part.len() != (end - start) * 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed());
            }
            for (offset, slot) in bytes[start..end].iter_mut().enumerate() {
                let pair = &part[offset * 2..offset * 2 + 2];
                *slot = u8::from_str_radix(pair, 16).map_err(|_| malformed())?;
            }
        }

        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex_lite::Regex;

    fn canonical_pattern() -> Regex {
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
    }

    #[test]
    fn test_sequential_layout_fixture() {
        // 0x5d9b95d2 is the low half of the timestamp; the high half 0x00000001
        // is overwritten by the sequence number.
        let id = TicketId::sequential(1, 0x0000_0001_5d9b_95d2);
        let bytes = id.as_bytes();
        assert_eq!(&bytes[..8], &[0x00, 0x00, 0x00, 0x01, 0x5d, 0x9b, 0x95, 0xd2]);

        let id = TicketId::sequential(0x0102_0304, 0xaabb_ccdd_1122_3344);
        assert_eq!(
            &id.as_bytes()[..8],
            &[0x01, 0x02, 0x03, 0x04, 0x11, 0x22, 0x33, 0x44]
        );
        assert_eq!(id.sequence(), 0x0102_0304);
        assert_eq!(id.timestamp_low(), 0x1122_3344);
    }

    #[test]
    fn test_display_fixture() {
        let bytes = [
            0x00, 0x00, 0x00, 0x01, 0x5d, 0x9b, 0x95, 0xd2, 0xde, 0x8d, 0x9c, 0x7c, 0xb2, 0x14,
            0x51, 0xfa, 0xc9, 0xc1,
        ];
        let id = TicketId::from_bytes(bytes);
        assert_eq!(id.to_string(), "00000001-5d9b-95d2-de8d-9c7cb21451fa");
    }

    #[test]
    fn test_random_ids_are_canonical() {
        let pattern = canonical_pattern();
        for _ in 0..100 {
            let rendered = TicketId::random().to_string();
            assert_eq!(rendered.len(), TICKET_STR_LEN);
            assert!(pattern.is_match(&rendered), "not canonical: {}", rendered);
        }
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id: TicketId = "0000002A-5D9B-95d2-de8d-9c7cb21451fa".parse().unwrap();
        assert_eq!(id.sequence(), 42);
        assert_eq!(id.to_string(), "0000002a-5d9b-95d2-de8d-9c7cb21451fa");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "",
            "00000001-5d9b-95d2-de8d",
            "00000001-5d9b-95d2-de8d-9c7cb21451fa-00",
            "000000015d9b-95d2-de8d-9c7cb21451fa-",
            "0000000g-5d9b-95d2-de8d-9c7cb21451fa",
            "+0000001-5d9b-95d2-de8d-9c7cb21451fa",
            "00000001-5d9b-95d2-de8d-9c7cb21451fac9c1",
        ] {
            let result = input.parse::<TicketId>();
            assert!(
                matches!(result, Err(TicketError::MalformedId(_))),
                "accepted {:?}",
                input
            );
        }
    }
}
