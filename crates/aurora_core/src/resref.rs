//! Fixed-width case-insensitive resource identifiers.

use std::fmt;
use std::io::{Read, Seek, Write};
use std::str::FromStr;

use binrw::{BinRead, BinResult, BinWrite, Endian};

use crate::error::{Error, Result};

/// A fixed-width resource name in canonical form.
///
/// Canonical form is lowercase ASCII, right-padded with NUL; bytes outside
/// `[0-9a-z_-]` are preserved as-is since the on-disk formats tolerate them.
/// Equality and hashing compare the canonical bytes, so two resrefs that
/// differ only in case or padding are equal.
///
/// The two widths used by the container formats get their own aliases:
/// [`ResRef16`] for legacy 16-character names and [`ResRef32`] for extended
/// 32-character names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResRef<const N: usize> {
    raw: [u8; N],
}

pub type ResRef16 = ResRef<16>;
pub type ResRef32 = ResRef<32>;

impl<const N: usize> ResRef<N> {
    /// Build a resref from a name.
    ///
    /// Fails with [`Error::Malformed`] when the name is longer than `N`
    /// bytes or contains an embedded NUL.
    pub fn new(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > N {
            return Err(Error::Malformed(format!(
                "resref {name:?} longer than {N} bytes"
            )));
        }
        if bytes.contains(&0) {
            return Err(Error::Malformed(format!(
                "resref {name:?} contains an embedded NUL"
            )));
        }
        let mut raw = [0u8; N];
        for (dst, src) in raw.iter_mut().zip(bytes) {
            *dst = src.to_ascii_lowercase();
        }
        Ok(ResRef { raw })
    }

    /// Canonicalize an on-disk image: lowercase, truncate at the first NUL.
    pub fn from_raw(image: [u8; N]) -> Self {
        let mut raw = [0u8; N];
        for (dst, src) in raw.iter_mut().zip(image) {
            if src == 0 {
                break;
            }
            *dst = src.to_ascii_lowercase();
        }
        ResRef { raw }
    }

    /// The canonical padded image, as written to disk.
    pub fn raw(&self) -> &[u8; N] {
        &self.raw
    }

    /// The name without padding.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.raw.iter().position(|&b| b == 0).unwrap_or(N);
        &self.raw[..end]
    }

    /// Length of the name in bytes.
    pub fn name_len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw[0] == 0
    }
}

impl<const N: usize> fmt::Display for ResRef<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&String::from_utf8_lossy(self.as_bytes()), f)
    }
}

impl<const N: usize> fmt::Debug for ResRef<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ResRef<{N}>({self})")
    }
}

impl<const N: usize> FromStr for ResRef<N> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ResRef16> for ResRef32 {
    fn from(short: ResRef16) -> Self {
        let mut raw = [0u8; 32];
        raw[..16].copy_from_slice(short.raw());
        ResRef32 { raw }
    }
}

impl TryFrom<ResRef32> for ResRef16 {
    type Error = Error;

    /// Fails when the trimmed name does not fit in 16 bytes.
    fn try_from(wide: ResRef32) -> Result<Self> {
        let bytes = wide.as_bytes();
        if bytes.len() > 16 {
            return Err(Error::Malformed(format!(
                "resref {wide} does not fit in 16 bytes"
            )));
        }
        let mut raw = [0u8; 16];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(ResRef16 { raw })
    }
}

impl<const N: usize> BinRead for ResRef<N> {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let mut image = [0u8; N];
        reader.read_exact(&mut image)?;
        Ok(Self::from_raw(image))
    }
}

impl<const N: usize> BinWrite for ResRef<N> {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        writer.write_all(&self.raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{ResRef16, ResRef32};
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_is_lowercase_trimmed() {
        let a = ResRef16::new("NW_Script").unwrap();
        let b = ResRef16::from_raw(*b"nw_script\0\0\0\0\0\0\0");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "nw_script");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for name in ["abc", "ABC", "a_b-c", "x1", ""] {
            let once = ResRef16::new(name).unwrap();
            let twice = ResRef16::from_raw(*once.raw());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn embedded_nul_rejected_padding_trimmed() {
        assert!(ResRef16::new("ab\0cd").is_err());
        let r = ResRef16::from_raw(*b"ab\0cd\0\0\0\0\0\0\0\0\0\0\0");
        assert_eq!(r.as_bytes(), b"ab");
    }

    #[test]
    fn too_long_rejected() {
        assert!(ResRef16::new("01234567890123456").is_err());
        assert!(ResRef16::new("0123456789012345").is_ok());
    }

    #[test]
    fn widen_and_narrow() {
        let short = ResRef16::new("module").unwrap();
        let wide: ResRef32 = short.into();
        assert_eq!(wide.to_string(), "module");
        assert_eq!(ResRef16::try_from(wide).unwrap(), short);

        let long = ResRef32::new("a_name_longer_than_16_chars").unwrap();
        assert!(ResRef16::try_from(long).is_err());
    }
}
