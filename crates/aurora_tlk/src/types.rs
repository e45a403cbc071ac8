//! Base types for the structure of TLK files and localized strings.

use std::fmt;

use aurora_core::ResRef16;
use binrw::{BinRead, BinWrite};

use crate::error::Result;
use crate::read::TalkSet;

/// TLK file header, following the 8 magic/version bytes.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct TlkHeader {
    /// Language of every string in this table
    pub language: u32,

    /// Number of entries in the string-entry table
    pub string_count: u32,

    /// Offset of the string-data block from the start of the file
    pub string_data_offset: u32,
}

/// TLK string-entry table element.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct TlkEntry {
    /// Bit 0 set when the entry carries text
    pub flags: u32,

    /// Voice-over resource name
    pub sound_resref: ResRef16,

    /// Unused by the game
    pub volume_variance: u32,

    /// Unused by the game
    pub pitch_variance: u32,

    /// Offset of the text within the string-data block
    pub offset_to_string: u32,

    /// Length of the text in bytes
    pub string_length: u32,

    /// Duration of the voice-over in seconds
    pub sound_length: f32,
}

impl TlkEntry {
    pub const FLAG_TEXT_PRESENT: u32 = 0x1;

    pub fn has_text(&self) -> bool {
        self.flags & Self::FLAG_TEXT_PRESENT != 0
    }
}

/// A 32-bit handle into a talk table.
///
/// The low 24 bits index the table; [`StringRef::CUSTOM_FLAG`] selects the
/// custom table over the base table. `0xFFFFFFFF` is the reserved invalid
/// reference.
#[derive(BinRead, BinWrite, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(pub u32);

impl StringRef {
    pub const INVALID: StringRef = StringRef(0xFFFF_FFFF);
    pub const CUSTOM_FLAG: u32 = 0x0100_0000;
    pub const INDEX_MASK: u32 = 0x00FF_FFFF;

    /// A reference into the base table.
    pub fn base(index: u32) -> Self {
        StringRef(index & Self::INDEX_MASK)
    }

    /// A reference into the custom table.
    pub fn custom(index: u32) -> Self {
        StringRef((index & Self::INDEX_MASK) | Self::CUSTOM_FLAG)
    }

    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }

    /// Whether the custom-table flag is set.
    pub fn is_custom(self) -> bool {
        !self.is_invalid() && self.0 & Self::CUSTOM_FLAG != 0
    }

    /// The entry index within the selected table.
    pub fn index(self) -> u32 {
        self.0 & Self::INDEX_MASK
    }
}

impl fmt::Display for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_invalid() {
            f.write_str("strref:invalid")
        } else if self.is_custom() {
            write!(f, "strref:custom:{}", self.index())
        } else {
            write!(f, "strref:{}", self.index())
        }
    }
}

impl fmt::Debug for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StringRef({self})")
    }
}

/// Languages a localized string may carry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u32)]
pub enum Language {
    #[default]
    English = 0,
    French = 1,
    German = 2,
    Italian = 3,
    Spanish = 4,
    Polish = 5,
    Korean = 128,
    ChineseTraditional = 129,
    ChineseSimplified = 130,
    Japanese = 131,
}

impl Language {
    pub fn from_id(id: u32) -> Option<Language> {
        Some(match id {
            0 => Language::English,
            1 => Language::French,
            2 => Language::German,
            3 => Language::Italian,
            4 => Language::Spanish,
            5 => Language::Polish,
            128 => Language::Korean,
            129 => Language::ChineseTraditional,
            130 => Language::ChineseSimplified,
            131 => Language::Japanese,
            _ => return None,
        })
    }

    pub fn id(self) -> u32 {
        self as u32
    }
}

/// Substring gender, the low bit of a substring id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u32)]
pub enum Gender {
    #[default]
    Male = 0,
    Female = 1,
}

/// One localized substring: a raw `(language << 1) | gender` id and text.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SubString {
    pub id: u32,
    pub text: String,
}

impl SubString {
    pub fn new(language: Language, gender: Gender, text: impl Into<String>) -> Self {
        SubString {
            id: (language.id() << 1) | gender as u32,
            text: text.into(),
        }
    }

    pub fn language(&self) -> Option<Language> {
        Language::from_id(self.id >> 1)
    }

    pub fn gender(&self) -> Gender {
        if self.id & 1 == 0 {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

/// A string with a default numeric reference plus optional per-language
/// substrings.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LocString {
    pub strref: StringRef,
    pub substrings: Vec<SubString>,
}

impl Default for LocString {
    fn default() -> Self {
        LocString {
            strref: StringRef::INVALID,
            substrings: Vec::new(),
        }
    }
}

impl LocString {
    /// A locstring holding a single substring and no talk-table reference.
    pub fn from_text(language: Language, text: impl Into<String>) -> Self {
        LocString {
            strref: StringRef::INVALID,
            substrings: vec![SubString::new(language, Gender::Male, text)],
        }
    }

    /// The substring for an exact language/gender pair.
    pub fn get(&self, language: Language, gender: Gender) -> Option<&str> {
        let id = (language.id() << 1) | gender as u32;
        self.substrings
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.text.as_str())
    }

    /// The first substring in file order.
    pub fn first(&self) -> Option<&str> {
        self.substrings.first().map(|s| s.text.as_str())
    }

    /// Resolve to concrete text: the preferred language, else the first
    /// substring, else the talk-table reference, else empty.
    pub fn resolve(
        &self,
        language: Language,
        gender: Gender,
        talk: Option<&TalkSet>,
    ) -> Result<String> {
        if let Some(text) = self.get(language, gender) {
            return Ok(text.to_owned());
        }
        if let Some(text) = self.first() {
            return Ok(text.to_owned());
        }
        match talk {
            Some(talk) if !self.strref.is_invalid() => talk.resolve(self.strref),
            _ => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Gender, Language, LocString, StringRef, SubString};
    use pretty_assertions::assert_eq;

    #[test]
    fn strref_flag_and_index() {
        let base = StringRef(0x0000_0005);
        assert!(!base.is_custom());
        assert_eq!(base.index(), 5);

        let custom = StringRef(0x0100_0005);
        assert!(custom.is_custom());
        assert_eq!(custom.index(), 5);

        assert!(StringRef::INVALID.is_invalid());
        assert!(!StringRef::INVALID.is_custom());
    }

    #[test]
    fn substring_id_packs_language_and_gender() {
        let s = SubString::new(Language::German, Gender::Female, "Hallo");
        assert_eq!(s.id, 5);
        assert_eq!(s.language(), Some(Language::German));
        assert_eq!(s.gender(), Gender::Female);
    }

    #[test]
    fn locstring_prefers_exact_language() {
        let loc = LocString {
            strref: StringRef::INVALID,
            substrings: vec![
                SubString::new(Language::French, Gender::Male, "Bonjour"),
                SubString::new(Language::English, Gender::Male, "Hello"),
            ],
        };
        assert_eq!(loc.get(Language::English, Gender::Male), Some("Hello"));
        assert_eq!(loc.first(), Some("Bonjour"));
        assert_eq!(
            loc.resolve(Language::English, Gender::Male, None).unwrap(),
            "Hello"
        );
        assert_eq!(
            loc.resolve(Language::Polish, Gender::Male, None).unwrap(),
            "Bonjour"
        );
    }
}
