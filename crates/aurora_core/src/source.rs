//! Byte-range views over in-memory buffers and open files.

use std::fmt::{self, Debug};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A shared open file supporting positioned reads.
///
/// Reads never touch a shared cursor, so any number of [`ByteSource`] views
/// over the same file may read in parallel.
struct SharedFile {
    #[cfg(unix)]
    file: File,
    #[cfg(not(unix))]
    file: std::sync::Mutex<File>,
    len: u64,
}

impl SharedFile {
    fn new(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(SharedFile {
            #[cfg(unix)]
            file,
            #[cfg(not(unix))]
            file: std::sync::Mutex::new(file),
            len,
        })
    }

    fn read_exact_at(&self, pos: u64, buf: &mut [u8]) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::FileExt::read_exact_at(&self.file, buf, pos)
        }
        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
            file.seek(SeekFrom::Start(pos))?;
            file.read_exact(buf)
        }
    }
}

impl Debug for SharedFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SharedFile").field("len", &self.len).finish()
    }
}

#[derive(Clone)]
enum Backing {
    Memory(Arc<[u8]>),
    File(Arc<SharedFile>),
}

impl Debug for Backing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Backing::Memory(data) => write!(f, "Memory({} bytes)", data.len()),
            Backing::File(shared) => write!(f, "File({} bytes)", shared.len),
        }
    }
}

/// A view over a byte range backed by memory or by an open file.
///
/// Cloning is cheap (the backing storage is reference-counted) and
/// [`ByteSource::slice`] produces narrowed views without copying, which is
/// how archive readers hand out per-resource ranges.
#[derive(Clone, Debug)]
pub struct ByteSource {
    backing: Backing,
    offset: u64,
    len: u64,
}

impl ByteSource {
    /// Wrap an owned buffer.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from_arc(data.into())
    }

    /// Wrap a shared buffer.
    pub fn from_arc(data: Arc<[u8]>) -> Self {
        let len = data.len() as u64;
        ByteSource {
            backing: Backing::Memory(data),
            offset: 0,
            len,
        }
    }

    /// Open a file and view its full range.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(File::open(path)?)
    }

    /// View the full range of an already-open file.
    pub fn from_file(file: File) -> Result<Self> {
        let shared = SharedFile::new(file)?;
        let len = shared.len;
        Ok(ByteSource {
            backing: Backing::File(Arc::new(shared)),
            offset: 0,
            len,
        })
    }

    /// Length of this view in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether this view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Narrow to a sub-range of this view.
    ///
    /// Fails with [`Error::Bounds`] if `offset + len` escapes the view.
    pub fn slice(&self, offset: u64, len: u64) -> Result<ByteSource> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| Error::bounds(offset, len, self.len))?;
        if end > self.len {
            return Err(Error::bounds(offset, len, self.len));
        }
        Ok(ByteSource {
            backing: self.backing.clone(),
            offset: self.offset + offset,
            len,
        })
    }

    /// Read `buf.len()` bytes starting at `offset` within this view.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let len = buf.len() as u64;
        let end = offset
            .checked_add(len)
            .ok_or_else(|| Error::bounds(offset, len, self.len))?;
        if end > self.len {
            return Err(Error::bounds(offset, len, self.len));
        }
        match &self.backing {
            Backing::Memory(data) => {
                let start = (self.offset + offset) as usize;
                buf.copy_from_slice(&data[start..start + buf.len()]);
                Ok(())
            }
            Backing::File(shared) => {
                shared.read_exact_at(self.offset + offset, buf)?;
                Ok(())
            }
        }
    }

    /// The whole view as a slice, without copying. `None` when file-backed.
    pub fn as_memory(&self) -> Option<&[u8]> {
        match &self.backing {
            Backing::Memory(data) => {
                let start = self.offset as usize;
                Some(&data[start..start + self.len as usize])
            }
            Backing::File(_) => None,
        }
    }

    /// Materialize the whole view into an owned buffer.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        if let Some(slice) = self.as_memory() {
            return Ok(slice.to_vec());
        }
        let mut buf = vec![0u8; self.len as usize];
        self.read_at(0, &mut buf)?;
        Ok(buf)
    }
}
