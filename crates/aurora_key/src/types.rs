//! Base types for the structure of KEY and BIF files.

use aurora_core::{ResRef16, ResType};
use binrw::{BinRead, BinWrite};

/// KEY file header, following the 8 magic/version bytes.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct KeyHeader {
    /// Number of entries in the BIF file table
    pub bif_count: u32,

    /// Number of entries in the key table
    pub key_count: u32,

    pub offset_to_file_table: u32,
    pub offset_to_key_table: u32,

    /// Years since 1900
    pub build_year: u32,

    /// Day of year
    pub build_day: u32,

    pub reserved: [u8; 32],
}

/// File-table element naming one BIF.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct FileEntry {
    /// Size of the BIF on disk
    pub file_size: u32,

    /// Offset of the filename within the KEY file
    pub filename_offset: u32,

    /// Filename length in bytes, no terminator
    pub filename_size: u16,

    /// Install-drive bits
    pub drives: u16,
}

/// Key-table element binding a resource name to a BIF slot.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct KeyEntry {
    pub resref: ResRef16,
    pub restype: ResType,
    pub resource_id: u32,
}

/// BIF header, following the 8 magic/version bytes.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct BifHeader {
    /// Number of variable-resource entries
    pub variable_count: u32,

    /// Number of fixed-resource entries
    pub fixed_count: u32,

    pub offset_to_variable_table: u32,
}

/// Variable-resource table element.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct VariableEntry {
    /// Duplicate of the owning key's resource id
    pub id: u32,

    /// Offset of the payload from the start of the BIF
    pub offset: u32,

    /// Payload size in bytes
    pub size: u32,

    /// Resource type tag
    pub restype: u32,
}

/// A decoded `resource_id`: which BIF, and which variable-table slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct KeyLocation {
    pub bif_index: u32,
    pub variable_index: u32,
}

impl KeyLocation {
    pub fn from_resource_id(resource_id: u32) -> Self {
        KeyLocation {
            bif_index: resource_id >> 20,
            variable_index: resource_id & 0x000F_FFFF,
        }
    }

    pub fn to_resource_id(self) -> u32 {
        (self.bif_index << 20) | (self.variable_index & 0x000F_FFFF)
    }
}
