//! Base types for the structure of ERF files.

use aurora_core::{ResRef16, ResRef32, ResType};
use binrw::{BinRead, BinWrite};

pub(crate) const HEADER_SIZE: u64 = 160;

/// ERF file header.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct ErfHeader {
    pub file_type: [u8; 4],
    pub version: [u8; 4],

    /// Number of localized description strings
    pub language_count: u32,

    /// Byte size of the localized description block
    pub localized_string_size: u32,

    /// Number of resources in the archive
    pub entry_count: u32,

    pub offset_to_localized_strings: u32,
    pub offset_to_keys: u32,
    pub offset_to_resources: u32,

    /// Years since 1900
    pub build_year: u32,

    /// Day of year
    pub build_day: u32,

    /// Talk-table reference for the description
    pub description_strref: u32,

    pub reserved: [u8; 116],
}

/// Key-table element of a V1.0 archive (16-byte resrefs).
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct ErfKey16 {
    pub resref: ResRef16,
    pub resource_id: u32,
    pub restype: ResType,
    pub unused: u16,
}

/// Key-table element of a V1.1 archive (32-byte resrefs).
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct ErfKey32 {
    pub resref: ResRef32,
    pub resource_id: u32,
    pub restype: ResType,
    pub unused: u16,
}

/// Resource-table element, parallel to the key table.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct ResourceEntry {
    /// Offset of the payload from the start of the file
    pub offset: u32,

    /// Payload size in bytes
    pub size: u32,
}

/// The archive flavor recorded in the file-type magic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ErfKind {
    #[default]
    Erf,
    Mod,
    Hak,
    Sav,
    Nwm,
}

impl ErfKind {
    pub fn magic(self) -> &'static [u8; 4] {
        match self {
            ErfKind::Erf => b"ERF ",
            ErfKind::Mod => b"MOD ",
            ErfKind::Hak => b"HAK ",
            ErfKind::Sav => b"SAV ",
            ErfKind::Nwm => b"NWM ",
        }
    }

    pub fn from_magic(magic: &[u8; 4]) -> Option<ErfKind> {
        Some(match magic {
            b"ERF " => ErfKind::Erf,
            b"MOD " => ErfKind::Mod,
            b"HAK " => ErfKind::Hak,
            b"SAV " => ErfKind::Sav,
            b"NWM " => ErfKind::Nwm,
            _ => return None,
        })
    }
}

/// The two supported revisions, distinguished by resref width.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ErfVersion {
    /// `"V1.0"`, 16-byte resrefs
    #[default]
    V10,
    /// `"V1.1"`, 32-byte resrefs
    V11,
}

impl ErfVersion {
    pub fn magic(self) -> &'static [u8; 4] {
        match self {
            ErfVersion::V10 => b"V1.0",
            ErfVersion::V11 => b"V1.1",
        }
    }

    /// Byte stride of one key-table element.
    pub fn key_stride(self) -> u64 {
        match self {
            ErfVersion::V10 => 24,
            ErfVersion::V11 => 40,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ErfKey16, ErfKind};
    use aurora_core::{ResRef16, ResType};
    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn kind_magic_round_trip() {
        for kind in [
            ErfKind::Erf,
            ErfKind::Mod,
            ErfKind::Hak,
            ErfKind::Sav,
            ErfKind::Nwm,
        ] {
            assert_eq!(ErfKind::from_magic(kind.magic()), Some(kind));
        }
        assert_eq!(ErfKind::from_magic(b"GFF "), None);
    }

    #[test]
    fn key16_byte_image() {
        #[rustfmt::skip]
        let image = [
            b'f', b'o', b'o', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0x02, 0x00, 0x00, 0x00,
            0x0A, 0x00,
            0x00, 0x00,
        ];

        let key = ErfKey16::read(&mut Cursor::new(&image)).unwrap();
        assert_eq!(key.resref, ResRef16::new("foo").unwrap());
        assert_eq!(key.resource_id, 2);
        assert_eq!(key.restype, ResType::TXT);

        let mut out = Cursor::new(Vec::new());
        key.write(&mut out).unwrap();
        assert_eq!(out.into_inner(), image);
    }
}
