//! Types for reading ERF archives.

use std::path::Path;

use aurora_core::{ByteReader, ByteSource, ResourceKey, ResRef32};
use aurora_tlk::{LocString, StringRef, SubString};
use indexmap::IndexMap;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::types::{
    ErfHeader, ErfKey16, ErfKey32, ErfKind, ErfVersion, ResourceEntry, HEADER_SIZE,
};

/// ERF archive reader.
///
/// The key and resource tables are materialized at open; payloads are
/// handed out as sub-range views of the backing source.
///
/// ```no_run
/// use aurora_core::{ResourceKey, ResRef32, ResType};
///
/// fn dump(path: &str) -> aurora_core::Result<()> {
///     let erf = aurora_erf::ErfArchive::open(path)?;
///     for key in erf.keys() {
///         println!("{key}");
///     }
///     let key = ResourceKey::new(ResRef32::new("module")?, ResType::IFO);
///     if let Some(ifo) = erf.by_key(&key)? {
///         println!("module.ifo is {} bytes", ifo.len());
///     }
///     Ok(())
/// }
/// ```
pub struct ErfArchive {
    source: ByteSource,
    kind: ErfKind,
    version: ErfVersion,
    header: ErfHeader,
    description: LocString,
    entries: IndexMap<ResourceKey, ResourceEntry>,
}

impl ErfArchive {
    /// Parse an ERF archive from a byte source.
    #[instrument(skip(source), err)]
    pub fn new(source: ByteSource) -> Result<ErfArchive> {
        let mut reader = ByteReader::new(source.clone());
        if source.len() < HEADER_SIZE {
            return Err(Error::bounds(0, HEADER_SIZE, source.len()));
        }
        let header: ErfHeader = reader.read_record()?;

        let Some(kind) = ErfKind::from_magic(&header.file_type) else {
            return Err(Error::bad_magic("ERF |MOD |HAK |SAV |NWM ", &header.file_type));
        };
        let version = match &header.version {
            b"V1.0" => ErfVersion::V10,
            b"V1.1" => ErfVersion::V11,
            b"V2.0" | b"V2.2" | b"V3.0" => {
                return Err(Error::Unsupported(
                    "ERF V2.0+ archives (compression and encryption)",
                ));
            }
            other => return Err(Error::bad_magic("V1.0", other)),
        };

        let len = source.len();
        let entries_u64 = u64::from(header.entry_count);
        check_region(len, header.offset_to_localized_strings, u64::from(header.localized_string_size))?;
        check_region(len, header.offset_to_keys, entries_u64 * version.key_stride())?;
        check_region(len, header.offset_to_resources, entries_u64 * 8)?;

        let description = read_description(&source, &header)?;

        // key table, widened to 32-byte resrefs
        reader.seek_to(u64::from(header.offset_to_keys))?;
        let mut keys = Vec::with_capacity(header.entry_count as usize);
        for _ in 0..header.entry_count {
            let (resref, restype) = match version {
                ErfVersion::V10 => {
                    let key: ErfKey16 = reader.read_record()?;
                    (ResRef32::from(key.resref), key.restype)
                }
                ErfVersion::V11 => {
                    let key: ErfKey32 = reader.read_record()?;
                    (key.resref, key.restype)
                }
            };
            keys.push(ResourceKey::new(resref, restype));
        }

        // resource table, validated against the file eagerly
        reader.seek_to(u64::from(header.offset_to_resources))?;
        let mut entries = IndexMap::with_capacity(header.entry_count as usize);
        for key in keys {
            let entry: ResourceEntry = reader.read_record()?;
            check_region(len, entry.offset, u64::from(entry.size))?;
            entries.insert(key, entry);
        }

        Ok(ErfArchive {
            source,
            kind,
            version,
            header,
            description,
            entries,
        })
    }

    /// Open and parse an ERF file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<ErfArchive> {
        Self::new(ByteSource::open(path)?)
    }

    /// Parse an archive held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<ErfArchive> {
        Self::new(ByteSource::from_vec(data))
    }

    pub fn kind(&self) -> ErfKind {
        self.kind
    }

    pub fn version(&self) -> ErfVersion {
        self.version
    }

    /// Build year (years since 1900) and day of year from the header.
    pub fn build_date(&self) -> (u32, u32) {
        (self.header.build_year, self.header.build_day)
    }

    /// The localized description, with its talk-table reference.
    pub fn description(&self) -> &LocString {
        &self.description
    }

    /// Number of resources in the archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the resource keys in key-table order.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.entries.keys()
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// A view of the payload for `key`, or `None` when absent.
    pub fn by_key(&self, key: &ResourceKey) -> Result<Option<ByteSource>> {
        match self.entries.get(key) {
            Some(entry) => Ok(Some(
                self.source
                    .slice(u64::from(entry.offset), u64::from(entry.size))?,
            )),
            None => Ok(None),
        }
    }

    /// A view of the payload at a key-table position.
    pub fn by_index(&self, index: usize) -> Result<Option<(ResourceKey, ByteSource)>> {
        match self.entries.get_index(index) {
            Some((key, entry)) => Ok(Some((
                *key,
                self.source
                    .slice(u64::from(entry.offset), u64::from(entry.size))?,
            ))),
            None => Ok(None),
        }
    }
}

fn check_region(file_len: u64, offset: u32, len: u64) -> Result<()> {
    if u64::from(offset) + len > file_len {
        return Err(Error::bounds(u64::from(offset), len, file_len));
    }
    Ok(())
}

fn read_description(source: &ByteSource, header: &ErfHeader) -> Result<LocString> {
    let region = source.slice(
        u64::from(header.offset_to_localized_strings),
        u64::from(header.localized_string_size),
    )?;
    let mut reader = ByteReader::new(region);
    let mut substrings = Vec::with_capacity(header.language_count as usize);
    for _ in 0..header.language_count {
        let id = reader.read_u32()?;
        let len = reader.read_u32()?;
        let text = {
            let bytes = reader.read_bytes(len as usize)?;
            String::from_utf8_lossy(&bytes).into_owned()
        };
        substrings.push(SubString { id, text });
    }
    Ok(LocString {
        strref: StringRef(header.description_strref),
        substrings,
    })
}
