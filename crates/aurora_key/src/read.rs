//! Types for reading KEY indexes and BIF data files.

use std::path::{Path, PathBuf};

use aurora_core::{ByteReader, ByteSource, ResRef16, ResType};
use indexmap::IndexMap;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::types::{BifHeader, FileEntry, KeyEntry, KeyHeader, KeyLocation, VariableEntry};

const KEY_MAGIC: &[u8; 4] = b"KEY ";
const BIF_MAGIC: &[u8; 4] = b"BIFF";
const V1_MAGIC: &[u8; 4] = b"V1  ";

const KEY_HEADER_SIZE: u64 = 64;
const FILE_ENTRY_SIZE: u64 = 12;
const KEY_ENTRY_SIZE: u64 = 22;
const BIF_HEADER_SIZE: u64 = 20;
const VARIABLE_ENTRY_SIZE: u64 = 16;

/// A BIF named by a KEY's file table.
#[derive(Debug, Clone, PartialEq)]
pub struct BifReference {
    /// Install-relative path with `\` separators, as stored
    pub name: String,

    /// Expected size of the BIF on disk
    pub file_size: u32,

    /// Install-drive bits
    pub drives: u16,
}

impl BifReference {
    /// The stored name converted to a host path.
    pub fn path(&self) -> PathBuf {
        self.name.split('\\').collect()
    }
}

/// A parsed KEY index.
pub struct KeyIndex {
    files: Vec<BifReference>,
    keys: IndexMap<(ResRef16, ResType), u32>,
    build_year: u32,
    build_day: u32,
}

impl KeyIndex {
    /// Parse a KEY file from a byte source.
    #[instrument(skip(source), err)]
    pub fn new(source: ByteSource) -> Result<KeyIndex> {
        let mut reader = ByteReader::new(source.clone());

        let magic = reader.read_bytes(4)?.into_owned();
        if magic != KEY_MAGIC {
            return Err(Error::bad_magic("KEY ", &magic));
        }
        let version = reader.read_bytes(4)?.into_owned();
        if version != V1_MAGIC {
            return Err(Error::bad_magic("V1  ", &version));
        }

        let header: KeyHeader = reader.read_record()?;
        let len = source.len();
        check_table(len, header.offset_to_file_table, header.bif_count, FILE_ENTRY_SIZE)?;
        check_table(len, header.offset_to_key_table, header.key_count, KEY_ENTRY_SIZE)?;

        reader.seek_to(u64::from(header.offset_to_file_table))?;
        let mut file_entries = Vec::with_capacity(header.bif_count as usize);
        for _ in 0..header.bif_count {
            file_entries.push(reader.read_record::<FileEntry>()?);
        }

        let mut files = Vec::with_capacity(file_entries.len());
        for entry in &file_entries {
            let mut name = vec![0u8; usize::from(entry.filename_size)];
            source.read_at(u64::from(entry.filename_offset), &mut name)?;
            files.push(BifReference {
                name: String::from_utf8_lossy(&name).into_owned(),
                file_size: entry.file_size,
                drives: entry.drives,
            });
        }

        reader.seek_to(u64::from(header.offset_to_key_table))?;
        let mut keys = IndexMap::with_capacity(header.key_count as usize);
        for _ in 0..header.key_count {
            let entry: KeyEntry = reader.read_record()?;
            let location = KeyLocation::from_resource_id(entry.resource_id);
            if location.bif_index >= header.bif_count {
                return Err(Error::Malformed(format!(
                    "key entry {} names BIF {} of {}",
                    entry.resref, location.bif_index, header.bif_count
                )));
            }
            keys.insert((entry.resref, entry.restype), entry.resource_id);
        }

        Ok(KeyIndex {
            files,
            keys,
            build_year: header.build_year,
            build_day: header.build_day,
        })
    }

    /// Open and parse a `.key` file.
    pub fn open(path: impl AsRef<Path>) -> Result<KeyIndex> {
        Self::new(ByteSource::open(path)?)
    }

    /// Parse a KEY file held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<KeyIndex> {
        Self::new(ByteSource::from_vec(data))
    }

    /// Build year (years since 1900) and day of year from the header.
    pub fn build_date(&self) -> (u32, u32) {
        (self.build_year, self.build_day)
    }

    /// Number of BIFs named by the file table.
    pub fn bif_count(&self) -> usize {
        self.files.len()
    }

    /// The file-table entry at `index`.
    pub fn bif(&self, index: u32) -> Option<&BifReference> {
        self.files.get(index as usize)
    }

    /// Number of cataloged resources.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate the cataloged `(resref, type)` pairs in key-table order.
    pub fn keys(&self) -> impl Iterator<Item = &(ResRef16, ResType)> {
        self.keys.keys()
    }

    /// Resolve a name to its BIF slot.
    pub fn resolve(&self, resref: &ResRef16, restype: ResType) -> Option<KeyLocation> {
        self.keys
            .get(&(*resref, restype))
            .map(|&id| KeyLocation::from_resource_id(id))
    }
}

/// A parsed BIF data file.
///
/// Only the variable-resource table is honored; lookups addressed past it
/// (fixed resources) report not-found.
pub struct BifArchive {
    source: ByteSource,
    variable: Vec<VariableEntry>,
    fixed_count: u32,
}

impl BifArchive {
    /// Parse a BIF file from a byte source.
    #[instrument(skip(source), err)]
    pub fn new(source: ByteSource) -> Result<BifArchive> {
        let mut reader = ByteReader::new(source.clone());

        let magic = reader.read_bytes(4)?.into_owned();
        if magic != BIF_MAGIC {
            return Err(Error::bad_magic("BIFF", &magic));
        }
        let version = reader.read_bytes(4)?.into_owned();
        if version != V1_MAGIC {
            return Err(Error::bad_magic("V1  ", &version));
        }

        let header: BifHeader = reader.read_record()?;
        let len = source.len();
        check_table(
            len,
            header.offset_to_variable_table,
            header.variable_count,
            VARIABLE_ENTRY_SIZE,
        )?;

        reader.seek_to(u64::from(header.offset_to_variable_table))?;
        let mut variable = Vec::with_capacity(header.variable_count as usize);
        for _ in 0..header.variable_count {
            let entry: VariableEntry = reader.read_record()?;
            if u64::from(entry.offset) + u64::from(entry.size) > len {
                return Err(Error::bounds(
                    u64::from(entry.offset),
                    u64::from(entry.size),
                    len,
                ));
            }
            variable.push(entry);
        }

        Ok(BifArchive {
            source,
            variable,
            fixed_count: header.fixed_count,
        })
    }

    /// Open and parse a `.bif` file.
    pub fn open(path: impl AsRef<Path>) -> Result<BifArchive> {
        Self::new(ByteSource::open(path)?)
    }

    /// Parse a BIF held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<BifArchive> {
        Self::new(ByteSource::from_vec(data))
    }

    /// Number of variable resources.
    pub fn variable_count(&self) -> usize {
        self.variable.len()
    }

    /// Number of fixed resources declared by the header (never read).
    pub fn fixed_count(&self) -> u32 {
        self.fixed_count
    }

    /// The variable-table entry at `index`.
    pub fn entry(&self, index: u32) -> Option<&VariableEntry> {
        self.variable.get(index as usize)
    }

    /// A view of the payload in variable-table slot `index`.
    ///
    /// Indices past the variable table fail with [`Error::NotFound`]: the
    /// name may have matched a fixed entry, which this reader does not
    /// serve.
    pub fn open_variable(&self, index: u32) -> Result<ByteSource> {
        let entry = self.variable.get(index as usize).ok_or_else(|| {
            Error::NotFound(format!("variable resource {index} (fixed entries are not served)"))
        })?;
        self.source
            .slice(u64::from(entry.offset), u64::from(entry.size))
    }
}

fn check_table(file_len: u64, offset: u32, count: u32, stride: u64) -> Result<()> {
    let len = u64::from(count) * stride;
    if u64::from(offset) + len > file_len {
        return Err(Error::bounds(u64::from(offset), len, file_len));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{BifArchive, KeyIndex};
    use crate::error::Error;
    use crate::types::KeyLocation;
    use aurora_core::{ResRef16, ResType};
    use pretty_assertions::assert_eq;

    /// KEY image: file table then names then key table.
    pub(crate) fn build_key(bifs: &[&str], keys: &[(&str, ResType, u32)]) -> Vec<u8> {
        let file_table_offset = 64u32;
        let names_offset = file_table_offset + 12 * bifs.len() as u32;
        let names_size: u32 = bifs.iter().map(|n| n.len() as u32).sum();
        let key_table_offset = names_offset + names_size;

        let mut data = Vec::new();
        data.extend_from_slice(b"KEY V1  ");
        data.extend_from_slice(&(bifs.len() as u32).to_le_bytes());
        data.extend_from_slice(&(keys.len() as u32).to_le_bytes());
        data.extend_from_slice(&file_table_offset.to_le_bytes());
        data.extend_from_slice(&key_table_offset.to_le_bytes());
        data.extend_from_slice(&124u32.to_le_bytes());
        data.extend_from_slice(&11u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 32]);

        let mut name_cursor = names_offset;
        for name in bifs {
            data.extend_from_slice(&0u32.to_le_bytes());
            data.extend_from_slice(&name_cursor.to_le_bytes());
            data.extend_from_slice(&(name.len() as u16).to_le_bytes());
            data.extend_from_slice(&1u16.to_le_bytes());
            name_cursor += name.len() as u32;
        }
        for name in bifs {
            data.extend_from_slice(name.as_bytes());
        }
        for (resref, restype, resource_id) in keys {
            let mut raw = [0u8; 16];
            raw[..resref.len()].copy_from_slice(resref.as_bytes());
            data.extend_from_slice(&raw);
            data.extend_from_slice(&restype.0.to_le_bytes());
            data.extend_from_slice(&resource_id.to_le_bytes());
        }
        data
    }

    /// BIF image with payloads at caller-chosen offsets.
    pub(crate) fn build_bif(total_size: usize, entries: &[(u32, u32, u32, u32)]) -> Vec<u8> {
        let mut data = vec![0u8; total_size];
        data[0..8].copy_from_slice(b"BIFFV1  ");
        data[8..12].copy_from_slice(&(entries.len() as u32).to_le_bytes());
        data[12..16].copy_from_slice(&0u32.to_le_bytes());
        data[16..20].copy_from_slice(&20u32.to_le_bytes());
        let mut cursor = 20;
        for (id, offset, size, restype) in entries {
            data[cursor..cursor + 4].copy_from_slice(&id.to_le_bytes());
            data[cursor + 4..cursor + 8].copy_from_slice(&offset.to_le_bytes());
            data[cursor + 8..cursor + 12].copy_from_slice(&size.to_le_bytes());
            data[cursor + 12..cursor + 16].copy_from_slice(&restype.to_le_bytes());
            cursor += 16;
        }
        data
    }

    #[test]
    fn key_resolution() {
        let key = KeyIndex::from_vec(build_key(
            &["data\\base.bif", "data\\scripts.bif"],
            &[
                ("creature", ResType::MDL, 0x0000_0002),
                ("nwscript", ResType::NSS, 0x0010_0000),
            ],
        ))
        .unwrap();

        assert_eq!(key.bif_count(), 2);
        assert_eq!(key.bif(1).unwrap().name, "data\\scripts.bif");
        assert_eq!(
            key.bif(1).unwrap().path(),
            std::path::PathBuf::from("data").join("scripts.bif")
        );

        let nwscript = ResRef16::new("nwscript").unwrap();
        assert_eq!(
            key.resolve(&nwscript, ResType::NSS),
            Some(KeyLocation {
                bif_index: 1,
                variable_index: 0
            })
        );
        assert_eq!(key.resolve(&nwscript, ResType::NCS), None);
    }

    #[test]
    fn key_entry_naming_missing_bif_is_malformed() {
        let result = KeyIndex::from_vec(build_key(
            &["data\\base.bif"],
            &[("orphan", ResType::TXT, 0x0050_0000)],
        ));
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn bif_variable_slice() {
        let mut image = build_bif(256, &[(0, 128, 16, 10)]);
        image[128..144].copy_from_slice(b"sixteen payload!");

        let bif = BifArchive::from_vec(image).unwrap();
        assert_eq!(bif.variable_count(), 1);
        let payload = bif.open_variable(0).unwrap();
        assert_eq!(payload.to_vec().unwrap(), b"sixteen payload!");
    }

    #[test]
    fn bif_fixed_slot_is_not_found() {
        let bif = BifArchive::from_vec(build_bif(64, &[(0, 40, 8, 10)])).unwrap();
        assert!(matches!(bif.open_variable(5), Err(Error::NotFound(_))));
    }

    #[test]
    fn bif_entry_escaping_file_is_bounds() {
        let result = BifArchive::from_vec(build_bif(64, &[(0, 60, 16, 10)]));
        assert!(matches!(result, Err(Error::Bounds { .. })));
    }
}
