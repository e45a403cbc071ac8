//! Zip archives as a resource backend.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use aurora_core::{ByteReader, ByteSource, Error, ResourceKey, ResRef32, ResType};
use crc::Crc;
use flate2::read::DeflateDecoder;
use indexmap::IndexMap;
use tracing::instrument;

use crate::error::Result;
use crate::provider::ResourceProvider;

const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
const CENTRAL_SIGNATURE: u32 = 0x0201_4B50;
const LOCAL_SIGNATURE: u32 = 0x0403_4B50;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

/// Maximum distance of the end-of-central-directory record from the file
/// end: record size plus a 64 KiB comment.
const EOCD_SCAN: u64 = 22 + 65535;

const CRC32: Crc<u32> = Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// One member of the central directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipEntry {
    pub method: u16,
    pub flags: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub local_header_offset: u32,
}

/// A PKZIP archive reader supporting stored and deflate members.
///
/// Members are decompressed whole; there is no random access within a
/// compressed member. Decompressed bytes are verified against the CRC-32
/// recorded in the central directory.
pub struct ZipArchive {
    source: ByteSource,
    entries: IndexMap<String, ZipEntry>,
}

impl ZipArchive {
    /// Parse the central directory of a zip archive.
    #[instrument(skip(source), err)]
    pub fn new(source: ByteSource) -> Result<ZipArchive> {
        let len = source.len();
        if len < 22 {
            return Err(Error::Malformed("too small to be a zip archive".into()));
        }

        // find the end-of-central-directory record from the back
        let scan_len = len.min(EOCD_SCAN);
        let scan_base = len - scan_len;
        let tail = source.slice(scan_base, scan_len)?.to_vec()?;
        let eocd = tail
            .windows(4)
            .rposition(|w| w == EOCD_SIGNATURE)
            .ok_or_else(|| {
                Error::Malformed("end-of-central-directory signature not found".into())
            })?;
        if eocd + 22 > tail.len() {
            return Err(Error::Malformed("truncated end-of-central-directory".into()));
        }
        let entry_count = u16::from_le_bytes([tail[eocd + 10], tail[eocd + 11]]);
        let cd_offset = u32::from_le_bytes([
            tail[eocd + 16],
            tail[eocd + 17],
            tail[eocd + 18],
            tail[eocd + 19],
        ]);

        let mut reader = ByteReader::new(source.clone());
        reader.seek_to(u64::from(cd_offset))?;

        let mut entries = IndexMap::with_capacity(usize::from(entry_count));
        for _ in 0..entry_count {
            let signature = reader.read_u32()?;
            if signature != CENTRAL_SIGNATURE {
                return Err(Error::Malformed(format!(
                    "bad central-directory signature {signature:#010x}"
                )));
            }
            let _version_made_by = reader.read_u16()?;
            let _version_needed = reader.read_u16()?;
            let flags = reader.read_u16()?;
            let method = reader.read_u16()?;
            let _mod_time = reader.read_u16()?;
            let _mod_date = reader.read_u16()?;
            let crc32 = reader.read_u32()?;
            let compressed_size = reader.read_u32()?;
            let uncompressed_size = reader.read_u32()?;
            let name_len = reader.read_u16()?;
            let extra_len = reader.read_u16()?;
            let comment_len = reader.read_u16()?;
            let _disk_start = reader.read_u16()?;
            let _internal_attrs = reader.read_u16()?;
            let _external_attrs = reader.read_u32()?;
            let local_header_offset = reader.read_u32()?;

            let name = {
                let bytes = reader.read_bytes(usize::from(name_len))?;
                String::from_utf8_lossy(&bytes).into_owned()
            };
            let skip = u64::from(extra_len) + u64::from(comment_len);
            reader.seek_to(reader.position() + skip)?;

            entries.insert(
                name,
                ZipEntry {
                    method,
                    flags,
                    crc32,
                    compressed_size,
                    uncompressed_size,
                    local_header_offset,
                },
            );
        }

        Ok(ZipArchive { source, entries })
    }

    /// Open and parse a zip file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<ZipArchive> {
        Self::new(ByteSource::open(path)?)
    }

    /// Parse an archive held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<ZipArchive> {
        Self::new(ByteSource::from_vec(data))
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate member names in central-directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The central-directory record for a member.
    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.get(name)
    }

    /// Decompress a whole member and verify its checksum.
    #[instrument(skip(self), err)]
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("zip member {name:?}")))?;
        if entry.flags & 0x1 != 0 {
            return Err(Error::Unsupported("encrypted zip members"));
        }

        // the local header repeats the name and may carry different-length
        // extra fields; its lengths are the ones that position the data
        let mut reader = ByteReader::new(self.source.clone());
        reader.seek_to(u64::from(entry.local_header_offset))?;
        let signature = reader.read_u32()?;
        if signature != LOCAL_SIGNATURE {
            return Err(Error::Malformed(format!(
                "bad local-header signature {signature:#010x} for {name:?}"
            )));
        }
        reader.seek_to(u64::from(entry.local_header_offset) + 26)?;
        let name_len = reader.read_u16()?;
        let extra_len = reader.read_u16()?;
        let data_offset = u64::from(entry.local_header_offset)
            + 30
            + u64::from(name_len)
            + u64::from(extra_len);

        let compressed = self
            .source
            .slice(data_offset, u64::from(entry.compressed_size))?
            .to_vec()?;

        let data = match entry.method {
            METHOD_STORED => compressed,
            METHOD_DEFLATE => {
                let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
                DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut out)?;
                out
            }
            _ => {
                return Err(Error::Unsupported(
                    "zip compression methods beyond stored and deflate",
                ))
            }
        };

        if data.len() as u64 != u64::from(entry.uncompressed_size) {
            return Err(Error::Malformed(format!(
                "zip member {name:?} inflated to {} bytes, expected {}",
                data.len(),
                entry.uncompressed_size
            )));
        }
        if CRC32.checksum(&data) != entry.crc32 {
            return Err(Error::Malformed(format!(
                "zip member {name:?} failed its CRC-32 check"
            )));
        }
        Ok(data)
    }
}

/// A provider over a zip archive, matching members by basename.
///
/// A member `data/file.2da` serves the key `file.2da` regardless of its
/// directory; matching ignores case.
pub struct ZipProvider {
    label: String,
    archive: ZipArchive,
    index: HashMap<ResourceKey, String>,
}

impl ZipProvider {
    pub fn new(archive: ZipArchive, label: impl Into<String>) -> ZipProvider {
        let mut index = HashMap::new();
        for name in archive.names() {
            let Some(key) = key_for_member(name) else {
                continue;
            };
            // first member wins when basenames collide
            index.entry(key).or_insert_with(|| name.to_owned());
        }
        ZipProvider {
            label: label.into(),
            archive,
            index,
        }
    }

    /// Open a zip file and wrap it as a provider.
    pub fn open(path: impl AsRef<Path>) -> Result<ZipProvider> {
        let path = path.as_ref();
        Ok(Self::new(
            ZipArchive::open(path)?,
            format!("zip:{}", path.display()),
        ))
    }

    pub fn archive(&self) -> &ZipArchive {
        &self.archive
    }
}

fn key_for_member(name: &str) -> Option<ResourceKey> {
    let basename = name.rsplit(['/', '\\']).next()?;
    let (stem, ext) = basename.rsplit_once('.')?;
    let restype = ResType::from_ext(ext);
    if restype.is_invalid() {
        return None;
    }
    let resref = ResRef32::new(&stem.to_ascii_lowercase()).ok()?;
    Some(ResourceKey::new(resref, restype))
}

impl ResourceProvider for ZipProvider {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        self.index.contains_key(key)
    }

    fn open(&self, key: &ResourceKey) -> Result<Option<ByteSource>> {
        let Some(name) = self.index.get(key) else {
            return Ok(None);
        };
        Ok(Some(ByteSource::from_vec(self.archive.read(name)?)))
    }
}
