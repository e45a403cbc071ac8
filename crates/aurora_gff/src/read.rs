//! Lazy, validated navigation of parsed GFF files.

use std::path::Path;
use std::sync::Arc;

use aurora_core::{ByteReader, ByteSource, ResRef32};
use aurora_tlk::{Gender, Language, LocString, StringRef, SubString, TalkSet};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::types::{FieldEntry, FieldType, GffHeader, Quaternion, StructEntry, Vector3};

const VERSION: &[u8; 4] = b"V3.2";

const HEADER_SIZE: u64 = 56;
const STRUCT_SIZE: u64 = 12;
const FIELD_SIZE: u64 = 12;
const LABEL_SIZE: u64 = 16;

/// A parsed GFF file.
///
/// Structure is materialized lazily: opening validates the header and the
/// table spans, and every cross-table index is checked when an accessor
/// follows it. Navigation starts at [`Gff::root`].
pub struct Gff {
    source: ByteSource,
    header: GffHeader,
    language: Language,
    talk: Option<Arc<TalkSet>>,
}

fn check_span(file_len: u64, offset: u32, count: u32, stride: u64) -> Result<()> {
    let len = u64::from(count) * stride;
    if u64::from(offset) + len > file_len {
        return Err(Error::bounds(u64::from(offset), len, file_len));
    }
    Ok(())
}

impl Gff {
    /// Parse a GFF file from a byte source.
    #[instrument(skip(source), err)]
    pub fn new(source: ByteSource) -> Result<Gff> {
        let mut reader = ByteReader::new(source.clone());
        if source.len() < HEADER_SIZE {
            return Err(Error::bounds(0, HEADER_SIZE, source.len()));
        }
        let header: GffHeader = reader.read_record()?;
        if &header.version != VERSION {
            return Err(Error::bad_magic("V3.2", &header.version));
        }

        let len = source.len();
        check_span(len, header.struct_offset, header.struct_count, STRUCT_SIZE)?;
        check_span(len, header.field_offset, header.field_count, FIELD_SIZE)?;
        check_span(len, header.label_offset, header.label_count, LABEL_SIZE)?;
        check_span(len, header.field_data_offset, header.field_data_count, 1)?;
        check_span(len, header.field_indices_offset, header.field_indices_count, 1)?;
        check_span(len, header.list_indices_offset, header.list_indices_count, 1)?;

        if header.struct_count == 0 {
            return Err(Error::Malformed(
                "GFF struct table is empty, no root structure".into(),
            ));
        }

        Ok(Gff {
            source,
            header,
            language: Language::default(),
            talk: None,
        })
    }

    /// Open and parse a GFF file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Gff> {
        Self::new(ByteSource::open(path)?)
    }

    /// Parse a GFF file held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<Gff> {
        Self::new(ByteSource::from_vec(data))
    }

    /// The content tag from the header, e.g. `"IFO "`.
    pub fn file_type(&self) -> String {
        String::from_utf8_lossy(&self.header.file_type)
            .trim_end()
            .to_owned()
    }

    /// Default language for locstring resolution.
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Install the talk tables used to resolve locstring references.
    pub fn set_talk_set(&mut self, talk: Option<Arc<TalkSet>>) {
        self.talk = talk;
    }

    pub(crate) fn talk(&self) -> Option<&TalkSet> {
        self.talk.as_deref()
    }

    /// The structure whose entry sits at index zero.
    pub fn root(&self) -> Result<Struct<'_>> {
        Ok(Struct {
            gff: self,
            entry: self.struct_entry(0)?,
            fold: false,
        })
    }

    fn struct_entry(&self, index: u32) -> Result<StructEntry> {
        if index >= self.header.struct_count {
            return Err(Error::bounds(
                u64::from(index) * STRUCT_SIZE,
                STRUCT_SIZE,
                u64::from(self.header.struct_count) * STRUCT_SIZE,
            ));
        }
        let mut reader = ByteReader::new(self.source.clone());
        reader.seek_to(u64::from(self.header.struct_offset) + u64::from(index) * STRUCT_SIZE)?;
        reader.read_record()
    }

    fn field_entry(&self, index: u32) -> Result<FieldEntry> {
        if index >= self.header.field_count {
            return Err(Error::bounds(
                u64::from(index) * FIELD_SIZE,
                FIELD_SIZE,
                u64::from(self.header.field_count) * FIELD_SIZE,
            ));
        }
        let mut reader = ByteReader::new(self.source.clone());
        reader.seek_to(u64::from(self.header.field_offset) + u64::from(index) * FIELD_SIZE)?;
        reader.read_record()
    }

    fn label(&self, index: u32) -> Result<String> {
        if index >= self.header.label_count {
            return Err(Error::bounds(
                u64::from(index) * LABEL_SIZE,
                LABEL_SIZE,
                u64::from(self.header.label_count) * LABEL_SIZE,
            ));
        }
        let mut raw = [0u8; 16];
        self.source.read_at(
            u64::from(self.header.label_offset) + u64::from(index) * LABEL_SIZE,
            &mut raw,
        )?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(16);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Field index `i` of a struct whose indices live in the field-index
    /// array at byte offset `byte_offset`.
    fn field_index_at(&self, byte_offset: u32, i: u32) -> Result<u32> {
        let offset = u64::from(byte_offset) + u64::from(i) * 4;
        if offset + 4 > u64::from(self.header.field_indices_count) {
            return Err(Error::bounds(
                offset,
                4,
                u64::from(self.header.field_indices_count),
            ));
        }
        let mut buf = [0u8; 4];
        self.source
            .read_at(u64::from(self.header.field_indices_offset) + offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// A reader over the field-data blob starting at `offset`.
    fn blob_reader(&self, offset: u32) -> Result<ByteReader> {
        let blob_len = u64::from(self.header.field_data_count);
        if u64::from(offset) > blob_len {
            return Err(Error::bounds(u64::from(offset), 0, blob_len));
        }
        let slice = self.source.slice(
            u64::from(self.header.field_data_offset) + u64::from(offset),
            blob_len - u64::from(offset),
        )?;
        Ok(ByteReader::new(slice))
    }

    fn list_count(&self, byte_offset: u32) -> Result<u32> {
        self.list_u32(u64::from(byte_offset))
    }

    fn list_index(&self, byte_offset: u32, i: u32) -> Result<u32> {
        self.list_u32(u64::from(byte_offset) + 4 + u64::from(i) * 4)
    }

    fn list_u32(&self, offset: u64) -> Result<u32> {
        if offset + 4 > u64::from(self.header.list_indices_count) {
            return Err(Error::bounds(
                offset,
                4,
                u64::from(self.header.list_indices_count),
            ));
        }
        let mut buf = [0u8; 4];
        self.source
            .read_at(u64::from(self.header.list_indices_offset) + offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

/// Raw bytes and classification of a single field, for dump tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub field_type: FieldType,
    /// Whether the payload lives outside the field entry
    pub complex: bool,
    pub data: Vec<u8>,
}

/// A structure inside a parsed GFF file.
///
/// The handle borrows the reader; it is cheap to copy and navigate. Typed
/// accessors return `Ok(None)` when the field is missing or carries a
/// different type, so optional fields can be probed without error
/// handling. Structural violations (indices or payloads escaping their
/// tables) surface as hard errors.
#[derive(Clone, Copy)]
pub struct Struct<'g> {
    gff: &'g Gff,
    entry: StructEntry,
    fold: bool,
}

impl<'g> Struct<'g> {
    /// Programmer-defined tag of this structure.
    pub fn type_tag(&self) -> u32 {
        self.entry.type_tag
    }

    /// Number of fields in this structure.
    pub fn field_count(&self) -> u32 {
        self.entry.field_count
    }

    /// A copy of this handle whose name lookups ignore ASCII case.
    ///
    /// Label comparison is case-sensitive by default; some authored
    /// content relies on tolerant comparison.
    pub fn fold_names(&self) -> Struct<'g> {
        Struct { fold: true, ..*self }
    }

    fn field_table_index(&self, i: u32) -> Result<u32> {
        if self.entry.field_count == 1 {
            Ok(self.entry.data_or_offset)
        } else {
            self.gff.field_index_at(self.entry.data_or_offset, i)
        }
    }

    fn names_match(&self, label: &str, name: &str) -> bool {
        if self.fold {
            label.eq_ignore_ascii_case(name)
        } else {
            label == name
        }
    }

    fn find_field(&self, name: &str) -> Result<Option<FieldEntry>> {
        for i in 0..self.entry.field_count {
            let entry = self.gff.field_entry(self.field_table_index(i)?)?;
            let label = self.gff.label(entry.label_index)?;
            if self.names_match(&label, name) {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Position of a field within this structure, by name.
    pub fn field_index_by_name(&self, name: &str) -> Result<Option<u32>> {
        for i in 0..self.entry.field_count {
            let entry = self.gff.field_entry(self.field_table_index(i)?)?;
            let label = self.gff.label(entry.label_index)?;
            if self.names_match(&label, name) {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Name of the field at a struct-local position.
    pub fn field_name(&self, index: u32) -> Result<Option<String>> {
        if index >= self.entry.field_count {
            return Ok(None);
        }
        let entry = self.gff.field_entry(self.field_table_index(index)?)?;
        Ok(Some(self.gff.label(entry.label_index)?))
    }

    /// Type of the field at a struct-local position.
    pub fn field_type_at(&self, index: u32) -> Result<Option<FieldType>> {
        if index >= self.entry.field_count {
            return Ok(None);
        }
        let entry = self.gff.field_entry(self.field_table_index(index)?)?;
        self.decode_type(&entry).map(Some)
    }

    /// Type of a named field.
    pub fn field_type(&self, name: &str) -> Result<Option<FieldType>> {
        match self.find_field(name)? {
            Some(entry) => self.decode_type(&entry).map(Some),
            None => Ok(None),
        }
    }

    fn decode_type(&self, entry: &FieldEntry) -> Result<FieldType> {
        FieldType::from_tag(entry.type_tag).ok_or_else(|| {
            Error::Malformed(format!("unknown GFF field type tag {}", entry.type_tag))
        })
    }

    fn inline_field(&self, name: &str, ft: FieldType) -> Result<Option<u32>> {
        match self.find_field(name)? {
            Some(entry) if entry.type_tag == ft as u32 => Ok(Some(entry.data_or_offset)),
            _ => Ok(None),
        }
    }

    fn large_field(&self, name: &str, ft: FieldType) -> Result<Option<ByteReader>> {
        match self.find_field(name)? {
            Some(entry) if entry.type_tag == ft as u32 => {
                Ok(Some(self.gff.blob_reader(entry.data_or_offset)?))
            }
            _ => Ok(None),
        }
    }

    pub fn byte(&self, name: &str) -> Result<Option<u8>> {
        Ok(self.inline_field(name, FieldType::Byte)?.map(|v| v as u8))
    }

    /// BYTE field interpreted as a flag.
    pub fn byte_as_bool(&self, name: &str) -> Result<Option<bool>> {
        Ok(self.byte(name)?.map(|v| v != 0))
    }

    pub fn char(&self, name: &str) -> Result<Option<i8>> {
        Ok(self
            .inline_field(name, FieldType::Char)?
            .map(|v| v as u8 as i8))
    }

    pub fn word(&self, name: &str) -> Result<Option<u16>> {
        Ok(self.inline_field(name, FieldType::Word)?.map(|v| v as u16))
    }

    pub fn short(&self, name: &str) -> Result<Option<i16>> {
        Ok(self
            .inline_field(name, FieldType::Short)?
            .map(|v| v as u16 as i16))
    }

    pub fn dword(&self, name: &str) -> Result<Option<u32>> {
        self.inline_field(name, FieldType::Dword)
    }

    pub fn int(&self, name: &str) -> Result<Option<i32>> {
        Ok(self.inline_field(name, FieldType::Int)?.map(|v| v as i32))
    }

    /// INT field interpreted as a flag.
    pub fn int_as_bool(&self, name: &str) -> Result<Option<bool>> {
        Ok(self.int(name)?.map(|v| v != 0))
    }

    pub fn float(&self, name: &str) -> Result<Option<f32>> {
        Ok(self
            .inline_field(name, FieldType::Float)?
            .map(f32::from_bits))
    }

    pub fn dword64(&self, name: &str) -> Result<Option<u64>> {
        match self.large_field(name, FieldType::Dword64)? {
            Some(mut r) => Ok(Some(r.read_u64()?)),
            None => Ok(None),
        }
    }

    pub fn int64(&self, name: &str) -> Result<Option<i64>> {
        match self.large_field(name, FieldType::Int64)? {
            Some(mut r) => Ok(Some(r.read_i64()?)),
            None => Ok(None),
        }
    }

    pub fn double(&self, name: &str) -> Result<Option<f64>> {
        match self.large_field(name, FieldType::Double)? {
            Some(mut r) => Ok(Some(r.read_f64()?)),
            None => Ok(None),
        }
    }

    pub fn cexostring(&self, name: &str) -> Result<Option<String>> {
        let Some(mut r) = self.large_field(name, FieldType::CExoString)? else {
            return Ok(None);
        };
        let len = r.read_u32()?;
        let bytes = r.read_bytes(len as usize)?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    pub fn resref(&self, name: &str) -> Result<Option<ResRef32>> {
        let Some(mut r) = self.large_field(name, FieldType::ResRef)? else {
            return Ok(None);
        };
        let len = r.read_u8()? as usize;
        if len > 32 {
            return Err(Error::Malformed(format!(
                "resref payload of {len} bytes exceeds the 32-byte maximum"
            )));
        }
        let bytes = r.read_bytes(len)?;
        let mut raw = [0u8; 32];
        raw[..len].copy_from_slice(&bytes);
        Ok(Some(ResRef32::from_raw(raw)))
    }

    /// The raw locstring payload: string reference plus substrings.
    pub fn locstring(&self, name: &str) -> Result<Option<LocString>> {
        let Some(mut r) = self.large_field(name, FieldType::CExoLocString)? else {
            return Ok(None);
        };
        Ok(Some(read_locstring(&mut r)?))
    }

    /// A locstring resolved to concrete text with the reader's default
    /// language: preferred-language substring, else first substring, else
    /// the talk-table reference, else empty.
    pub fn cexolocstring(&self, name: &str) -> Result<Option<String>> {
        self.cexolocstring_in(name, self.gff.language(), Gender::Male)
    }

    /// [`Struct::cexolocstring`] with an explicit language preference.
    pub fn cexolocstring_in(
        &self,
        name: &str,
        language: Language,
        gender: Gender,
    ) -> Result<Option<String>> {
        let Some(loc) = self.locstring(name)? else {
            return Ok(None);
        };
        Ok(Some(loc.resolve(language, gender, self.gff.talk())?))
    }

    pub fn void(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let Some(mut r) = self.large_field(name, FieldType::Void)? else {
            return Ok(None);
        };
        let len = r.read_u32()?;
        Ok(Some(r.read_bytes(len as usize)?.into_owned()))
    }

    /// A VECTOR field (12 bytes of packed floats in field data).
    pub fn vector3(&self, name: &str) -> Result<Option<Vector3>> {
        match self.large_field(name, FieldType::Vector)? {
            Some(mut r) => Ok(Some(r.read_record()?)),
            None => Ok(None),
        }
    }

    /// A position packed as a struct of `x`, `y`, `z` floats.
    pub fn vector(&self, name: &str) -> Result<Option<Vector3>> {
        let Some(s) = self.structure(name)? else {
            return Ok(None);
        };
        let (Some(x), Some(y), Some(z)) = (s.float("x")?, s.float("y")?, s.float("z")?) else {
            return Ok(None);
        };
        Ok(Some(Vector3 { x, y, z }))
    }

    /// An orientation packed as a struct of `x`, `y`, `z`, `w` floats.
    pub fn quaternion(&self, name: &str) -> Result<Option<Quaternion>> {
        let Some(s) = self.structure(name)? else {
            return Ok(None);
        };
        let (Some(x), Some(y), Some(z), Some(w)) =
            (s.float("x")?, s.float("y")?, s.float("z")?, s.float("w")?)
        else {
            return Ok(None);
        };
        Ok(Some(Quaternion { x, y, z, w }))
    }

    /// A nested structure field.
    ///
    /// An empty name yields this structure itself, which lets code written
    /// against nested types also run on list elements.
    pub fn structure(&self, name: &str) -> Result<Option<Struct<'g>>> {
        if name.is_empty() {
            return Ok(Some(*self));
        }
        match self.find_field(name)? {
            Some(entry) if entry.type_tag == FieldType::Struct as u32 => Ok(Some(Struct {
                gff: self.gff,
                entry: self.gff.struct_entry(entry.data_or_offset)?,
                fold: self.fold,
            })),
            _ => Ok(None),
        }
    }

    /// Number of elements in a LIST field.
    pub fn list_len(&self, name: &str) -> Result<Option<u32>> {
        match self.find_field(name)? {
            Some(entry) if entry.type_tag == FieldType::List as u32 => {
                Ok(Some(self.gff.list_count(entry.data_or_offset)?))
            }
            _ => Ok(None),
        }
    }

    /// Element `index` of a LIST field. Out-of-range indices yield `None`.
    pub fn list_element(&self, name: &str, index: u32) -> Result<Option<Struct<'g>>> {
        match self.find_field(name)? {
            Some(entry) if entry.type_tag == FieldType::List as u32 => {
                let count = self.gff.list_count(entry.data_or_offset)?;
                if index >= count {
                    return Ok(None);
                }
                let struct_index = self.gff.list_index(entry.data_or_offset, index)?;
                Ok(Some(Struct {
                    gff: self.gff,
                    entry: self.gff.struct_entry(struct_index)?,
                    fold: self.fold,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Raw data of the field at a struct-local position.
    pub fn field_raw(&self, index: u32) -> Result<Option<RawField>> {
        if index >= self.entry.field_count {
            return Ok(None);
        }
        let entry = self.gff.field_entry(self.field_table_index(index)?)?;
        let name = self.gff.label(entry.label_index)?;
        let field_type = self.decode_type(&entry)?;

        let data = match field_type {
            FieldType::Byte | FieldType::Char => vec![entry.data_or_offset as u8],
            FieldType::Word | FieldType::Short => {
                entry.data_or_offset.to_le_bytes()[..2].to_vec()
            }
            FieldType::Dword | FieldType::Int | FieldType::Float => {
                entry.data_or_offset.to_le_bytes().to_vec()
            }
            FieldType::Dword64 | FieldType::Int64 | FieldType::Double => {
                let mut r = self.gff.blob_reader(entry.data_or_offset)?;
                r.read_bytes(8)?.into_owned()
            }
            FieldType::Vector => {
                let mut r = self.gff.blob_reader(entry.data_or_offset)?;
                r.read_bytes(12)?.into_owned()
            }
            FieldType::CExoString | FieldType::Void => {
                let mut r = self.gff.blob_reader(entry.data_or_offset)?;
                let len = r.read_u32()?;
                r.read_bytes(len as usize)?.into_owned()
            }
            FieldType::ResRef => {
                let mut r = self.gff.blob_reader(entry.data_or_offset)?;
                let len = r.read_u8()?;
                r.read_bytes(len as usize)?.into_owned()
            }
            FieldType::CExoLocString => {
                let mut r = self.gff.blob_reader(entry.data_or_offset)?;
                let len = r.read_u32()?;
                r.read_bytes(len as usize)?.into_owned()
            }
            FieldType::Struct | FieldType::List | FieldType::Reserved => {
                entry.data_or_offset.to_le_bytes().to_vec()
            }
        };

        Ok(Some(RawField {
            name,
            field_type,
            complex: field_type.is_complex(),
            data,
        }))
    }
}

fn read_locstring(r: &mut ByteReader) -> Result<LocString> {
    let total = u64::from(r.read_u32()?);
    let strref = StringRef(r.read_u32()?);
    let count = r.read_u32()?;
    let mut consumed: u64 = 8;
    let mut substrings = Vec::new();
    for _ in 0..count {
        let id = r.read_u32()?;
        let len = u64::from(r.read_u32()?);
        consumed += 8 + len;
        if consumed > total {
            return Err(Error::Malformed(format!(
                "CExoLocString substrings overrun the declared total length {total}"
            )));
        }
        let text = {
            let bytes = r.read_bytes(len as usize)?;
            String::from_utf8_lossy(&bytes).into_owned()
        };
        substrings.push(SubString { id, text });
    }
    if consumed != total {
        return Err(Error::Malformed(format!(
            "CExoLocString total length {total} does not match summed substring size {consumed}"
        )));
    }
    Ok(LocString { strref, substrings })
}

#[cfg(test)]
mod test {
    use super::Gff;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    /// Header + one struct holding a single inline DWORD field `Test`.
    fn single_dword_gff(value: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"GFF V3.2");
        for (offset, count) in [
            (56u32, 1u32), // structs
            (68, 1),       // fields
            (80, 1),       // labels
            (96, 0),       // field data
            (96, 0),       // field indices
            (96, 0),       // list indices
        ] {
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&count.to_le_bytes());
        }
        // struct 0: type 0, single field index 0
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        // field 0: DWORD, label 0, inline value
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&value.to_le_bytes());
        // label 0
        data.extend_from_slice(b"Test\0\0\0\0\0\0\0\0\0\0\0\0");
        data
    }

    #[test]
    fn inline_dword_access() {
        let gff = Gff::from_vec(single_dword_gff(1234)).unwrap();
        let root = gff.root().unwrap();
        assert_eq!(root.field_count(), 1);
        assert_eq!(root.dword("Test").unwrap(), Some(1234));
        assert_eq!(root.dword("Missing").unwrap(), None);
        // probing with the wrong type is not an error
        assert_eq!(root.int("Test").unwrap(), None);
    }

    #[test]
    fn strict_and_fold_name_lookup() {
        let gff = Gff::from_vec(single_dword_gff(7)).unwrap();
        let root = gff.root().unwrap();
        assert_eq!(root.dword("test").unwrap(), None);
        assert_eq!(root.fold_names().dword("test").unwrap(), Some(7));
    }

    #[test]
    fn bad_version_rejected() {
        let mut data = single_dword_gff(0);
        data[4..8].copy_from_slice(b"V3.3");
        assert!(matches!(Gff::from_vec(data), Err(Error::BadMagic { .. })));
    }

    #[test]
    fn truncated_label_table_is_bounds() {
        let mut data = single_dword_gff(0);
        data.truncate(90);
        assert!(matches!(Gff::from_vec(data), Err(Error::Bounds { .. })));
    }

    #[test]
    fn empty_struct_name_returns_self() {
        let gff = Gff::from_vec(single_dword_gff(99)).unwrap();
        let root = gff.root().unwrap();
        let same = root.structure("").unwrap().unwrap();
        assert_eq!(same.dword("Test").unwrap(), Some(99));
    }
}
