//! Types for reading TLK talk tables.

use std::path::Path;

use aurora_core::{ByteReader, ByteSource};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::types::{Language, StringRef, TlkEntry, TlkHeader};

const MAGIC: &[u8; 4] = b"TLK ";
const VERSION: &[u8; 4] = b"V3.0";

/// Size of the fixed header including magic and version.
const HEADER_SIZE: u64 = 20;
const ENTRY_SIZE: u64 = 40;

/// A parsed talk table.
///
/// The entry table is materialized at open; string text is read lazily from
/// the backing source on lookup.
pub struct TalkTable {
    source: ByteSource,
    header: TlkHeader,
    entries: Vec<TlkEntry>,
}

impl TalkTable {
    /// Parse a talk table from a byte source.
    #[instrument(skip(source), err)]
    pub fn new(source: ByteSource) -> Result<TalkTable> {
        let mut reader = ByteReader::new(source.clone());

        let magic = reader.read_bytes(4)?.into_owned();
        if magic != MAGIC {
            return Err(Error::bad_magic("TLK ", &magic));
        }
        let version = reader.read_bytes(4)?.into_owned();
        if version != VERSION {
            return Err(Error::bad_magic("V3.0", &version));
        }

        let header: TlkHeader = reader.read_record()?;

        let table_len = u64::from(header.string_count) * ENTRY_SIZE;
        let table_end = HEADER_SIZE + table_len;
        if table_end > source.len() {
            return Err(Error::bounds(HEADER_SIZE, table_len, source.len()));
        }
        if u64::from(header.string_data_offset) > source.len() {
            return Err(Error::bounds(
                u64::from(header.string_data_offset),
                0,
                source.len(),
            ));
        }

        let mut entries = Vec::with_capacity(header.string_count as usize);
        for _ in 0..header.string_count {
            entries.push(reader.read_record::<TlkEntry>()?);
        }

        Ok(TalkTable {
            source,
            header,
            entries,
        })
    }

    /// Open and parse a `.tlk` file.
    pub fn open(path: impl AsRef<Path>) -> Result<TalkTable> {
        Self::new(ByteSource::open(path)?)
    }

    /// Parse a talk table held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<TalkTable> {
        Self::new(ByteSource::from_vec(data))
    }

    /// Language id recorded in the header.
    pub fn language_id(&self) -> u32 {
        self.header.language
    }

    /// Language recorded in the header, when it is a known id.
    pub fn language(&self) -> Option<Language> {
        Language::from_id(self.header.language)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw entry at `index`, if in range.
    pub fn entry(&self, index: u32) -> Option<&TlkEntry> {
        self.entries.get(index as usize)
    }

    /// The text of entry `index`.
    ///
    /// Out-of-range indices and entries without the text-present flag
    /// resolve to the empty string. An entry whose recorded text range
    /// escapes the file fails with [`Error::Bounds`].
    pub fn string(&self, index: u32) -> Result<String> {
        let Some(entry) = self.entries.get(index as usize) else {
            return Ok(String::new());
        };
        if !entry.has_text() || entry.string_length == 0 {
            return Ok(String::new());
        }
        let offset = u64::from(self.header.string_data_offset) + u64::from(entry.offset_to_string);
        let mut buf = vec![0u8; entry.string_length as usize];
        self.source.read_at(offset, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// The active pair of talk tables: the base game table plus an optional
/// module-supplied custom table.
#[derive(Default)]
pub struct TalkSet {
    base: Option<TalkTable>,
    custom: Option<TalkTable>,
}

impl TalkSet {
    pub fn new(base: Option<TalkTable>, custom: Option<TalkTable>) -> Self {
        TalkSet { base, custom }
    }

    pub fn base(&self) -> Option<&TalkTable> {
        self.base.as_ref()
    }

    pub fn custom(&self) -> Option<&TalkTable> {
        self.custom.as_ref()
    }

    /// Install or replace the custom table.
    pub fn set_custom(&mut self, custom: Option<TalkTable>) {
        self.custom = custom;
    }

    /// Resolve a [`StringRef`] against the pair.
    ///
    /// The custom-flag bit selects the custom table; a missing table, an
    /// invalid reference, or an out-of-range index all resolve to the
    /// empty string.
    pub fn resolve(&self, strref: StringRef) -> Result<String> {
        if strref.is_invalid() {
            return Ok(String::new());
        }
        let table = if strref.is_custom() {
            self.custom.as_ref()
        } else {
            self.base.as_ref()
        };
        match table {
            Some(table) => table.string(strref.index()),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{TalkSet, TalkTable};
    use crate::error::Error;
    use crate::types::StringRef;
    use pretty_assertions::assert_eq;

    /// Build a single-language table: header + entries + string data.
    fn build_tlk(language: u32, strings: &[Option<&str>]) -> Vec<u8> {
        let mut data = Vec::new();
        let mut text = Vec::new();

        data.extend_from_slice(b"TLK V3.0");
        data.extend_from_slice(&language.to_le_bytes());
        data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        let data_offset = 20 + strings.len() as u32 * 40;
        data.extend_from_slice(&data_offset.to_le_bytes());

        for s in strings {
            let (flags, offset, len) = match s {
                Some(s) => {
                    let offset = text.len() as u32;
                    text.extend_from_slice(s.as_bytes());
                    (1u32, offset, s.len() as u32)
                }
                None => (0u32, 0, 0),
            };
            data.extend_from_slice(&flags.to_le_bytes());
            data.extend_from_slice(&[0u8; 16]);
            data.extend_from_slice(&0u32.to_le_bytes());
            data.extend_from_slice(&0u32.to_le_bytes());
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&len.to_le_bytes());
            data.extend_from_slice(&0f32.to_le_bytes());
        }

        data.extend_from_slice(&text);
        data
    }

    #[test]
    fn read_strings() {
        let tlk = TalkTable::from_vec(build_tlk(0, &[Some("Hello"), None, Some("World")])).unwrap();
        assert_eq!(tlk.len(), 3);
        assert_eq!(tlk.string(0).unwrap(), "Hello");
        assert_eq!(tlk.string(2).unwrap(), "World");
    }

    #[test]
    fn absent_flag_and_out_of_range_are_empty() {
        let tlk = TalkTable::from_vec(build_tlk(0, &[Some("Hello"), None])).unwrap();
        assert_eq!(tlk.string(1).unwrap(), "");
        assert_eq!(tlk.string(999).unwrap(), "");
    }

    #[test]
    fn bad_magic_rejected() {
        let mut data = build_tlk(0, &[]);
        data[0..4].copy_from_slice(b"XLK ");
        assert!(matches!(
            TalkTable::from_vec(data),
            Err(Error::BadMagic { .. })
        ));
    }

    #[test]
    fn truncated_entry_table_is_bounds() {
        let mut data = build_tlk(0, &[Some("Hello")]);
        data.truncate(30);
        assert!(matches!(
            TalkTable::from_vec(data),
            Err(Error::Bounds { .. })
        ));
    }

    #[test]
    fn custom_flag_selects_custom_table() {
        let base = TalkTable::from_vec(build_tlk(0, &[
            Some("zero"),
            Some("one"),
            Some("two"),
            Some("three"),
            Some("Base"),
        ]))
        .unwrap();
        let custom = TalkTable::from_vec(build_tlk(0, &[
            Some("c0"),
            Some("c1"),
            Some("c2"),
            Some("c3"),
            Some("c4"),
            Some("Custom"),
        ]))
        .unwrap();
        let talk = TalkSet::new(Some(base), Some(custom));

        assert_eq!(talk.resolve(StringRef(0x0000_0004)).unwrap(), "Base");
        assert_eq!(talk.resolve(StringRef(0x0100_0005)).unwrap(), "Custom");
        assert_eq!(talk.resolve(StringRef::INVALID).unwrap(), "");
    }

    #[test]
    fn missing_custom_table_is_empty() {
        let base = TalkTable::from_vec(build_tlk(0, &[Some("Base")])).unwrap();
        let talk = TalkSet::new(Some(base), None);
        assert_eq!(talk.resolve(StringRef(0x0100_0000)).unwrap(), "");
    }
}
