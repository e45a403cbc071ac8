//! Types for writing ERF archives.

use std::io::{Seek, Write};

use aurora_core::{ResourceKey, ResRef16, ResRef32, ResType};
use binrw::BinWrite;
use bon::Builder;
use indexmap::IndexMap;
use tracing::instrument;

use crate::error::Result;
use crate::types::{ErfHeader, ErfKey16, ErfKey32, ErfKind, ErfVersion, ResourceEntry, HEADER_SIZE};
use aurora_tlk::LocString;

/// Options for how the ERF file should be written.
#[derive(Debug, Clone, Copy, Builder)]
pub struct ErfWriterOptions {
    /// The archive flavor recorded in the file-type magic
    #[builder(default)]
    pub kind: ErfKind,

    /// V1.0 writes 16-byte resrefs, V1.1 writes 32-byte resrefs
    #[builder(default)]
    pub version: ErfVersion,

    /// Build year stamped into the header, years since 1900
    #[builder(default)]
    pub build_year: u32,

    /// Build day stamped into the header, day of year
    #[builder(default)]
    pub build_day: u32,
}

/// ERF archive generator.
///
/// Resources are collected in memory and emitted by [`ErfWriter::finish`].
/// Payloads keep their insertion order; the key table is sorted by
/// `(type, resref)` so index lookups can binary-search it. The emitted
/// byte image is fully determined by the inputs.
///
/// ```
/// use aurora_core::{ResRef32, ResType};
/// use aurora_erf::{ErfWriter, ErfWriterOptions};
/// use std::io::Cursor;
///
/// # fn doit() -> aurora_core::Result<()> {
/// let mut erf = ErfWriter::new(ErfWriterOptions::builder().build());
/// erf.add(ResRef32::new("readme")?, ResType::TXT, b"hello".to_vec())?;
/// let bytes = erf.finish(Cursor::new(Vec::new()))?.into_inner();
/// # let _ = bytes;
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct ErfWriter {
    options: ErfWriterOptions,
    description: LocString,
    entries: IndexMap<ResourceKey, Vec<u8>>,
}

impl ErfWriter {
    pub fn new(options: ErfWriterOptions) -> ErfWriter {
        ErfWriter {
            options,
            description: LocString::default(),
            entries: IndexMap::new(),
        }
    }

    /// Set the localized description emitted into the header block.
    pub fn set_description(&mut self, description: LocString) {
        self.description = description;
    }

    /// Queue a resource.
    ///
    /// For a V1.0 archive the resref must fit in 16 bytes. Adding the same
    /// `(resref, type)` twice replaces the earlier payload.
    #[instrument(skip(self, data), fields(size = data.len()), err)]
    pub fn add(&mut self, resref: ResRef32, restype: ResType, data: Vec<u8>) -> Result<()> {
        if self.options.version == ErfVersion::V10 {
            // surfaces oversized names at insertion rather than at finish
            ResRef16::try_from(resref)?;
        }
        self.entries.insert(ResourceKey::new(resref, restype), data);
        Ok(())
    }

    /// Number of queued resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit the archive and return the writer.
    #[instrument(skip(self, writer), err)]
    pub fn finish<W: Write + Seek>(self, mut writer: W) -> Result<W> {
        let entry_count = self.entries.len() as u32;
        let version = self.options.version;

        let loc_size: u32 = self
            .description
            .substrings
            .iter()
            .map(|s| 8 + s.text.len() as u32)
            .sum();

        let offset_to_localized_strings = HEADER_SIZE as u32;
        let offset_to_keys = offset_to_localized_strings + loc_size;
        let offset_to_resources = offset_to_keys + entry_count * version.key_stride() as u32;
        let payload_base = offset_to_resources + entry_count * 8;

        // payloads keep insertion order; precompute their offsets
        let mut payload_offsets = Vec::with_capacity(self.entries.len());
        let mut cursor = payload_base;
        for data in self.entries.values() {
            payload_offsets.push(cursor);
            cursor += data.len() as u32;
        }

        // key table order: sorted by (type, resref)
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| {
            let (key, _) = self.entries.get_index(i).expect("index within entry count");
            (key.restype, key.resref)
        });

        let header = ErfHeader {
            file_type: *self.options.kind.magic(),
            version: *version.magic(),
            language_count: self.description.substrings.len() as u32,
            localized_string_size: loc_size,
            entry_count,
            offset_to_localized_strings,
            offset_to_keys,
            offset_to_resources,
            build_year: self.options.build_year,
            build_day: self.options.build_day,
            description_strref: self.description.strref.0,
            reserved: [0u8; 116],
        };
        header.write(&mut writer)?;

        for sub in &self.description.substrings {
            sub.id.write_le(&mut writer)?;
            (sub.text.len() as u32).write_le(&mut writer)?;
            writer.write_all(sub.text.as_bytes())?;
        }

        for (position, &i) in order.iter().enumerate() {
            let (key, _) = self.entries.get_index(i).expect("index within entry count");
            match version {
                ErfVersion::V10 => ErfKey16 {
                    resref: ResRef16::try_from(key.resref)?,
                    resource_id: position as u32,
                    restype: key.restype,
                    unused: 0,
                }
                .write(&mut writer)?,
                ErfVersion::V11 => ErfKey32 {
                    resref: key.resref,
                    resource_id: position as u32,
                    restype: key.restype,
                    unused: 0,
                }
                .write(&mut writer)?,
            }
        }

        for &i in &order {
            let (_, data) = self.entries.get_index(i).expect("index within entry count");
            ResourceEntry {
                offset: payload_offsets[i],
                size: data.len() as u32,
            }
            .write(&mut writer)?;
        }

        for data in self.entries.values() {
            writer.write_all(data)?;
        }

        Ok(writer)
    }
}

impl Default for ErfWriter {
    fn default() -> Self {
        Self::new(ErfWriterOptions::builder().build())
    }
}
