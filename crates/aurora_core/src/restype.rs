//! Resource-kind tags and the extension registry.

use std::fmt;
use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};

use crate::resref::ResRef32;

/// A 16-bit tag naming the kind of a resource.
///
/// Known tags map bidirectionally to a short lowercase extension through
/// [`ResType::from_ext`] and [`ResType::ext`]; unknown extensions map to
/// [`ResType::INVALID`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResType(pub u16);

/// The fixed registry of known resource kinds.
///
/// Extensions are at most 3 characters for legacy kinds and 7 for the
/// extended ones.
static REGISTRY: &[(u16, &str)] = &[
    (1, "bmp"),
    (3, "tga"),
    (4, "wav"),
    (6, "plt"),
    (7, "ini"),
    (10, "txt"),
    (2002, "mdl"),
    (2009, "nss"),
    (2010, "ncs"),
    (2012, "are"),
    (2013, "set"),
    (2014, "ifo"),
    (2015, "bic"),
    (2016, "wok"),
    (2017, "2da"),
    (2018, "tlk"),
    (2022, "txi"),
    (2023, "git"),
    (2025, "uti"),
    (2027, "utc"),
    (2029, "dlg"),
    (2030, "itp"),
    (2032, "utt"),
    (2033, "dds"),
    (2035, "uts"),
    (2036, "ltr"),
    (2037, "gff"),
    (2038, "fac"),
    (2040, "ute"),
    (2042, "utd"),
    (2044, "utp"),
    (2045, "dft"),
    (2046, "gic"),
    (2047, "gui"),
    (2051, "utm"),
    (2052, "dwk"),
    (2053, "pwk"),
    (2056, "jrl"),
    (2057, "sav"),
    (2058, "utw"),
    (2060, "ssf"),
    (2061, "hak"),
    (2062, "nwm"),
    (2063, "bik"),
    (2064, "ndb"),
    (2065, "ptm"),
    (2066, "ptt"),
    (3002, "trn"),
    (3003, "utr"),
    (3006, "sef"),
    (3007, "pfx"),
    (3009, "lfx"),
    (3012, "ros"),
    (3015, "pfb"),
    (3016, "zip"),
    (3017, "wmp"),
    (3020, "wlk"),
    (3021, "xml"),
    (3035, "trx"),
    (4000, "mdb"),
    (4003, "gr2"),
    (4007, "jpg"),
    (4008, "pwc"),
    (9996, "ids"),
    (9997, "erf"),
    (9998, "bif"),
    (9999, "key"),
];

impl ResType {
    pub const INVALID: ResType = ResType(0xFFFF);

    pub const TXT: ResType = ResType(10);
    pub const MDL: ResType = ResType(2002);
    pub const NSS: ResType = ResType(2009);
    pub const NCS: ResType = ResType(2010);
    pub const ARE: ResType = ResType(2012);
    pub const IFO: ResType = ResType(2014);
    pub const TWO_DA: ResType = ResType(2017);
    pub const TLK: ResType = ResType(2018);
    pub const GIT: ResType = ResType(2023);
    pub const DLG: ResType = ResType(2029);
    pub const DDS: ResType = ResType(2033);
    pub const GFF: ResType = ResType(2037);
    pub const SAV: ResType = ResType(2057);
    pub const HAK: ResType = ResType(2061);
    pub const NWM: ResType = ResType(2062);
    pub const NDB: ResType = ResType(2064);
    pub const ERF: ResType = ResType(9997);
    pub const BIF: ResType = ResType(9998);
    pub const KEY: ResType = ResType(9999);

    /// Map an extension to its tag. Unknown extensions yield
    /// [`ResType::INVALID`]; comparison ignores case.
    pub fn from_ext(ext: &str) -> ResType {
        REGISTRY
            .iter()
            .find(|(_, e)| e.eq_ignore_ascii_case(ext))
            .map_or(ResType::INVALID, |&(tag, _)| ResType(tag))
    }

    /// The registered extension for this tag, if known.
    pub fn ext(self) -> Option<&'static str> {
        REGISTRY
            .iter()
            .find(|&&(tag, _)| tag == self.0)
            .map(|&(_, e)| e)
    }

    /// Every tag in the registry, for exhaustive sweeps.
    pub fn known() -> impl Iterator<Item = ResType> {
        REGISTRY.iter().map(|&(tag, _)| ResType(tag))
    }

    pub fn is_invalid(self) -> bool {
        self == ResType::INVALID
    }
}

impl fmt::Display for ResType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.ext() {
            Some(ext) => f.write_str(ext),
            None => write!(f, "restype#{}", self.0),
        }
    }
}

impl fmt::Debug for ResType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ResType({} = {self})", self.0)
    }
}

impl From<u16> for ResType {
    fn from(tag: u16) -> Self {
        ResType(tag)
    }
}

impl BinRead for ResType {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        Ok(ResType(u16::read_options(reader, endian, ())?))
    }
}

impl BinWrite for ResType {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.0.write_options(writer, endian, ())
    }
}

/// The pair a resource is looked up by.
///
/// Unique within a single provider; across providers, earlier providers
/// shadow later ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ResourceKey {
    pub resref: ResRef32,
    pub restype: ResType,
}

impl ResourceKey {
    pub fn new(resref: ResRef32, restype: ResType) -> Self {
        ResourceKey { resref, restype }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.resref, self.restype)
    }
}
