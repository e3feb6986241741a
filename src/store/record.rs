//! Entry record format for the persistent log store.
//!
//! Each mutation is one record:
//!
//! ```text
//! +---------------+
//! | Record Length | (u32 LE, total record length including this field)
//! +---------------+
//! | Key           | (length-prefixed string)
//! +---------------+
//! | Tombstone     | (u8: 0 = live, 1 = removed)
//! +---------------+
//! | Value         | (length-prefixed bytes, empty for tombstones)
//! +---------------+
//! | Checksum      | (u32 LE)
//! +---------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Read};

/// One persisted mutation: a live value for a key, or a tombstone marking
/// its removal. Multiple records for the same key may exist in the log;
/// the latest (by file order) wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Key the mutation applies to
    pub key: String,
    /// Whether this record removes the key
    pub is_tombstone: bool,
    /// Raw stored value (empty for tombstones)
    pub value: String,
}

impl EntryRecord {
    /// Create a record for a written value.
    pub fn live(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_tombstone: false,
            value: value.into(),
        }
    }

    /// Create a tombstone record for a removed key.
    pub fn tombstone(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_tombstone: true,
            value: String::new(),
        }
    }

    /// Minimum size of a serialized record in bytes.
    const MIN_SIZE: usize = 4 + 4 + 1 + 4 + 4;

    /// Serialize the record body (everything except length prefix and
    /// checksum). This is part of the data the checksum covers.
    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        // Key (length-prefixed)
        buf.extend_from_slice(&(self.key.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.key.as_bytes());

        // Tombstone flag
        buf.push(if self.is_tombstone { 1 } else { 0 });

        // Value (length-prefixed)
        buf.extend_from_slice(&(self.value.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.value.as_bytes());

        buf
    }

    /// Serialize the complete record to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();

        // Record length = 4 (length) + body.len() + 4 (checksum)
        let record_length = (4 + body.len() + 4) as u32;

        // Checksum covers: length + body
        let mut checksum_data = Vec::with_capacity(4 + body.len());
        checksum_data.extend_from_slice(&record_length.to_le_bytes());
        checksum_data.extend_from_slice(&body);
        let checksum = super::checksum::compute_checksum(&checksum_data);

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying the checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < Self::MIN_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < Self::MIN_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        // Extract and verify checksum
        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);

        let checksum_data = &data[0..checksum_offset];
        if !super::checksum::verify_checksum(checksum_data, stored_checksum) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "checksum mismatch: computed {:08x}, stored {:08x}",
                    super::checksum::compute_checksum(checksum_data),
                    stored_checksum
                ),
            ));
        }

        // Parse body
        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
            let mut len_buf = [0u8; 4];
            reader.read_exact(&mut len_buf)?;
            let len = u32::from_le_bytes(len_buf) as usize;

            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf)?;

            String::from_utf8(buf).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("invalid UTF-8: {}", e))
            })
        }

        let key = read_string(&mut cursor)?;

        let mut tombstone_buf = [0u8; 1];
        cursor.read_exact(&mut tombstone_buf)?;
        let is_tombstone = tombstone_buf[0] != 0;

        let value = read_string(&mut cursor)?;

        Ok((
            Self {
                key,
                is_tombstone,
                value,
            },
            record_length,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_record_roundtrip() {
        let record = EntryRecord::live("user", r#"{"name":"Alice"}"#);
        let serialized = record.serialize();
        let (deserialized, consumed) = EntryRecord::deserialize(&serialized).unwrap();

        assert_eq!(record, deserialized);
        assert_eq!(consumed, serialized.len());
    }

    #[test]
    fn test_tombstone_roundtrip() {
        let record = EntryRecord::tombstone("user");
        assert!(record.is_tombstone);
        assert!(record.value.is_empty());

        let serialized = record.serialize();
        let (deserialized, _) = EntryRecord::deserialize(&serialized).unwrap();
        assert!(deserialized.is_tombstone);
        assert_eq!(deserialized.key, "user");
    }

    #[test]
    fn test_empty_value_roundtrip() {
        let record = EntryRecord::live("blank", "");
        let serialized = record.serialize();
        let (deserialized, _) = EntryRecord::deserialize(&serialized).unwrap();
        assert!(!deserialized.is_tombstone);
        assert_eq!(deserialized.value, "");
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let record = EntryRecord::live("key", "value of some length");
        let mut serialized = record.serialize();

        let mid = serialized.len() / 2;
        serialized[mid] ^= 0xFF;

        let result = EntryRecord::deserialize(&serialized);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let record = EntryRecord::live("key", "value");
        let serialized = record.serialize();

        let result = EntryRecord::deserialize(&serialized[..serialized.len() - 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_input_rejected() {
        let result = EntryRecord::deserialize(&[0u8; 4]);
        assert!(result.is_err());
    }

    #[test]
    fn test_deterministic_serialization() {
        let record = EntryRecord::live("key", "value");
        assert_eq!(record.serialize(), record.serialize());
    }
}
