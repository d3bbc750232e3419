//! TLV support for the ID card files.
//!
//! Every record is a little-endian `u16` tag, a little-endian `u16` length and
//! exactly `length` octets of value, with no padding between records.

use std::collections::BTreeMap;

/// Mapping from tag to value of a single file.
pub type FieldTable = BTreeMap<u16, Vec<u8>>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("truncated tag or length at offset {offset}")]
    TruncatedHeader { offset: usize },

    #[error("value of tag {tag} at offset {offset} needs {length} octets, only {available} left")]
    TruncatedValue {
        tag: u16,
        offset: usize,
        length: usize,
        available: usize,
    },
}

/// Cursor over a TLV buffer.
struct Reader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    fn is_empty(&self) -> bool {
        self.cursor >= self.buffer.len()
    }

    fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Reads data of specified size and seeks the cursor, if that many octets are left.
    fn read(&mut self, length: usize) -> Option<&'a [u8]> {
        let bytes = self.buffer.get(self.cursor..self.cursor.checked_add(length)?)?;
        self.cursor += length;
        Some(bytes)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.read(2).map(|b| u16::from_le_bytes([b[0], b[1]]))
    }

    /// Reads a whole record at the current position, seeking the cursor.
    fn read_record(&mut self) -> Result<(u16, &'a [u8]), Error> {
        let offset = self.cursor;
        if self.remaining() < 4 {
            return Err(Error::TruncatedHeader { offset });
        }

        let tag = self.read_u16().ok_or(Error::TruncatedHeader { offset })?;
        let length = self.read_u16().ok_or(Error::TruncatedHeader { offset })? as usize;
        let available = self.remaining();

        self.read(length)
            .map(|value| (tag, value))
            .ok_or(Error::TruncatedValue {
                tag,
                offset,
                length,
                available,
            })
    }
}

/// Parses the buffer into a field table.
/// A tag repeated in the buffer keeps its last value.
pub fn decode(buf: &[u8]) -> Result<FieldTable, Error> {
    let mut reader = Reader::new(buf);
    let mut table = FieldTable::new();

    while !reader.is_empty() {
        let (tag, value) = reader.read_record()?;
        table.insert(tag, value.to_vec());
    }

    Ok(table)
}

/// Serialises the field table, in ascending tag order.
///
/// Values longer than `u16::MAX` octets cannot be represented and are a caller error.
pub fn encode(table: &FieldTable) -> Vec<u8> {
    let mut buf = Vec::with_capacity(table.values().map(|v| v.len() + 4).sum());

    for (tag, value) in table {
        buf.extend_from_slice(&tag.to_le_bytes());
        buf.extend_from_slice(&(value.len() as u16).to_le_bytes());
        buf.extend_from_slice(value);
    }

    buf
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_decode() {
        let buf = [
            0x0A, 0x06, 0x03, 0x00, b'0', b'0', b'7', // 1546
            0x0B, 0x06, 0x00, 0x00, // 1547, empty
            0x0C, 0x06, 0x02, 0x00, b'I', b'D', // 1548
        ];

        let table = decode(&buf).unwrap();

        assert_eq!(3, table.len());
        assert_eq!(b"007".to_vec(), table[&1546]);
        assert!(table[&1547].is_empty());
        assert_eq!(b"ID".to_vec(), table[&1548]);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_value() {
        let buf = [0x0A, 0x06, 0x09, 0x00, b'1', b'2', b'3'];

        assert_eq!(
            Err(Error::TruncatedValue {
                tag: 1546,
                offset: 0,
                length: 9,
                available: 3,
            }),
            decode(&buf),
        );
    }

    #[test]
    fn test_truncated_header() {
        let buf = [0x0A, 0x06, 0x01, 0x00, b'1', 0x0B, 0x06, 0x01];

        assert_eq!(Err(Error::TruncatedHeader { offset: 5 }), decode(&buf));
    }

    #[test]
    fn test_repeated_tag() {
        let buf = [0x01, 0x00, 0x01, 0x00, b'a', 0x01, 0x00, 0x01, 0x00, b'b'];

        assert_eq!(b"b".to_vec(), decode(&buf).unwrap()[&1]);
    }

    proptest! {
        #[test]
        fn test_round_trip(table in prop::collection::btree_map(
            any::<u16>(),
            prop::collection::vec(any::<u8>(), 0..64),
            0..16,
        )) {
            prop_assert_eq!(decode(&encode(&table)).unwrap(), table);
        }

        #[test]
        fn test_cut_inside_value_fails(
            value in prop::collection::vec(any::<u8>(), 1..64),
            cut in any::<prop::sample::Index>(),
        ) {
            let table = FieldTable::from([(1546, value)]);
            let buf = encode(&table);
            let end = 4 + cut.index(buf.len() - 4);

            let truncated = matches!(decode(&buf[..end]), Err(Error::TruncatedValue { .. }));
            prop_assert!(truncated);
        }
    }
}
