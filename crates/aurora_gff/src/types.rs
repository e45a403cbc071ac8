//! Base types for the structure of GFF files.

use binrw::{BinRead, BinWrite};

/// GFF file header.
///
/// The file type tag varies with content (`"IFO "`, `"ARE "`, `"UTC "`, …);
/// the version is always `"V3.2"`. Counts for the struct, field, and label
/// tables are element counts; counts for field data and the two index
/// arrays are byte sizes.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct GffHeader {
    pub file_type: [u8; 4],
    pub version: [u8; 4],
    pub struct_offset: u32,
    pub struct_count: u32,
    pub field_offset: u32,
    pub field_count: u32,
    pub label_offset: u32,
    pub label_count: u32,
    pub field_data_offset: u32,
    pub field_data_count: u32,
    pub field_indices_offset: u32,
    pub field_indices_count: u32,
    pub list_indices_offset: u32,
    pub list_indices_count: u32,
}

/// Struct-table element.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct StructEntry {
    /// Programmer-defined tag for the structure
    pub type_tag: u32,

    /// The single field index when `field_count == 1`, otherwise a byte
    /// offset into the field-index array
    pub data_or_offset: u32,

    /// Number of fields in the structure
    pub field_count: u32,
}

/// Field-table element.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct FieldEntry {
    /// On-disk field type tag, see [`FieldType`]
    pub type_tag: u32,

    /// Index into the label table
    pub label_index: u32,

    /// Inline value for simple types, otherwise an offset into field data
    /// (or the list-index array for LIST)
    pub data_or_offset: u32,
}

/// The data types a GFF field can carry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum FieldType {
    Byte = 0,
    Char = 1,
    Word = 2,
    Short = 3,
    Dword = 4,
    Int = 5,
    Dword64 = 6,
    Int64 = 7,
    Float = 8,
    Double = 9,
    CExoString = 10,
    ResRef = 11,
    CExoLocString = 12,
    Void = 13,
    Struct = 14,
    List = 15,
    Reserved = 16,
    Vector = 17,
}

impl FieldType {
    pub fn from_tag(tag: u32) -> Option<FieldType> {
        Some(match tag {
            0 => FieldType::Byte,
            1 => FieldType::Char,
            2 => FieldType::Word,
            3 => FieldType::Short,
            4 => FieldType::Dword,
            5 => FieldType::Int,
            6 => FieldType::Dword64,
            7 => FieldType::Int64,
            8 => FieldType::Float,
            9 => FieldType::Double,
            10 => FieldType::CExoString,
            11 => FieldType::ResRef,
            12 => FieldType::CExoLocString,
            13 => FieldType::Void,
            14 => FieldType::Struct,
            15 => FieldType::List,
            16 => FieldType::Reserved,
            17 => FieldType::Vector,
            _ => return None,
        })
    }

    /// Whether the field's payload lives outside the field entry itself.
    pub fn is_complex(self) -> bool {
        !matches!(
            self,
            FieldType::Byte
                | FieldType::Char
                | FieldType::Word
                | FieldType::Short
                | FieldType::Dword
                | FieldType::Int
                | FieldType::Float
        )
    }
}

/// A VECTOR field payload, 12 bytes in field data.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Default)]
#[brw(little)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// An orientation packed as a struct of `x`, `y`, `z`, `w` floats.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[cfg(test)]
mod test {
    use super::FieldType;

    #[test]
    fn tag_round_trip() {
        for tag in 0..=17u32 {
            let ft = FieldType::from_tag(tag).unwrap();
            assert_eq!(ft as u32, tag);
        }
        assert_eq!(FieldType::from_tag(18), None);
    }

    #[test]
    fn inline_types_are_simple() {
        assert!(!FieldType::Dword.is_complex());
        assert!(!FieldType::Float.is_complex());
        assert!(FieldType::Dword64.is_complex());
        assert!(FieldType::CExoString.is_complex());
        assert!(FieldType::List.is_complex());
    }
}
