//! NCS bytecode framing.

use std::path::Path;

use aurora_core::{ByteReader, ByteSource};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::ndb::Ndb;

const MAGIC: &[u8; 4] = b"NCS ";
const VERSION: &[u8; 4] = b"V1.0";
const SIZE_OPCODE: u8 = 0x42;
const HEADER_SIZE: u64 = 13;

/// A framed compiled script.
pub struct Ncs {
    source: ByteSource,
    program_size: u32,
}

impl Ncs {
    /// Validate the frame of a compiled script.
    #[instrument(skip(source), err)]
    pub fn new(source: ByteSource) -> Result<Ncs> {
        let mut reader = ByteReader::new(source.clone());

        let magic = reader.read_bytes(4)?.into_owned();
        if magic != MAGIC {
            return Err(Error::bad_magic("NCS ", &magic));
        }
        let version = reader.read_bytes(4)?.into_owned();
        if version != VERSION {
            return Err(Error::bad_magic("V1.0", &version));
        }

        let opcode = reader.read_u8()?;
        if opcode != SIZE_OPCODE {
            return Err(Error::Malformed(format!(
                "expected size opcode 0x42, found {opcode:#04x}"
            )));
        }
        // the single big-endian quantity in the format family
        let size_bytes = reader.read_bytes(4)?;
        let program_size = u32::from_be_bytes([
            size_bytes[0],
            size_bytes[1],
            size_bytes[2],
            size_bytes[3],
        ]);

        if u64::from(program_size) < HEADER_SIZE {
            return Err(Error::Malformed(format!(
                "declared program size {program_size} is smaller than the header"
            )));
        }
        if u64::from(program_size) > source.len() {
            return Err(Error::bounds(0, u64::from(program_size), source.len()));
        }

        Ok(Ncs {
            source,
            program_size,
        })
    }

    /// Open and validate a `.ncs` file.
    pub fn open(path: impl AsRef<Path>) -> Result<Ncs> {
        Self::new(ByteSource::open(path)?)
    }

    /// Validate a script held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<Ncs> {
        Self::new(ByteSource::from_vec(data))
    }

    /// Open a `.ncs` file and its `.ndb` sidecar when one exists.
    pub fn open_with_symbols(path: impl AsRef<Path>) -> Result<(Ncs, Option<Ndb>)> {
        let path = path.as_ref();
        let ncs = Self::open(path)?;
        let ndb_path = path.with_extension("ndb");
        let ndb = if ndb_path.is_file() {
            Some(Ndb::open(&ndb_path)?)
        } else {
            None
        };
        Ok((ncs, ndb))
    }

    /// Total size declared by the frame, header included.
    pub fn program_size(&self) -> u32 {
        self.program_size
    }

    /// The instruction-byte range.
    pub fn code(&self) -> Result<ByteSource> {
        self.source
            .slice(HEADER_SIZE, u64::from(self.program_size) - HEADER_SIZE)
    }
}
