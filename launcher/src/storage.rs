//! Storage reader.
//!
//! Loading is all-or-nothing: a buffer either holds the whole file or the
//! call fails. Handles are closed explicitly by the caller, whatever the
//! load outcome.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use iceboot_ice40::{RequestFile, RequestFs};
use tracing::{debug, trace};

use crate::error::StorageError;

/// Open, size and load image files.
pub trait StorageReader {
    /// An open file.
    type Handle;
    /// A fully loaded file. Dropping it frees the memory.
    type Buffer: AsRef<[u8]>;

    fn open(&mut self, path: &Path) -> Result<Self::Handle, StorageError>;

    /// File length in bytes.
    fn size(&mut self, handle: &mut Self::Handle) -> Result<usize, StorageError>;

    /// Allocate exactly `size` bytes and read the whole file into them.
    fn load_to_memory(&mut self, handle: &mut Self::Handle) -> Result<Self::Buffer, StorageError>;

    fn close(&mut self, handle: Self::Handle);
}

/// A bitstream held in memory.
#[derive(Debug)]
pub struct Bitstream {
    data: Vec<u8>,
}

impl Bitstream {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for Bitstream {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Open file plus the path it came from, for error reporting.
#[derive(Debug)]
pub struct FsHandle {
    file: File,
    path: PathBuf,
}

impl FsHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// [`StorageReader`] over the host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read until `buf` is full or the reader hits end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl StorageReader for FsStorage {
    type Handle = FsHandle;
    type Buffer = Bitstream;

    fn open(&mut self, path: &Path) -> Result<FsHandle, StorageError> {
        match File::open(path) {
            Ok(file) => {
                debug!(path = %path.display(), "opened");
                Ok(FsHandle {
                    file,
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(io_error(path, e)),
        }
    }

    fn size(&mut self, handle: &mut FsHandle) -> Result<usize, StorageError> {
        let meta = handle.file.metadata().map_err(|e| io_error(&handle.path, e))?;
        usize::try_from(meta.len()).map_err(|_| StorageError::OutOfMemory(usize::MAX))
    }

    fn load_to_memory(&mut self, handle: &mut FsHandle) -> Result<Bitstream, StorageError> {
        let size = self.size(handle)?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| StorageError::OutOfMemory(size))?;
        data.resize(size, 0);

        handle
            .file
            .seek(SeekFrom::Start(0))
            .map_err(|e| io_error(&handle.path, e))?;
        let read = read_full(&mut handle.file, &mut data).map_err(|e| io_error(&handle.path, e))?;
        if read != size {
            return Err(StorageError::ShortRead {
                path: handle.path.clone(),
                expected: size,
                actual: read,
            });
        }

        trace!(path = %handle.path.display(), bytes = size, "loaded to memory");
        Ok(Bitstream { data })
    }

    fn close(&mut self, handle: FsHandle) {
        debug!(path = %handle.path.display(), "closed");
        drop(handle);
    }
}

/// Data file opened for a device read request.
pub struct FsRequestFile {
    file: File,
    len: usize,
}

impl RequestFile for FsRequestFile {
    fn len(&self) -> usize {
        self.len
    }

    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> usize {
        if self.file.seek(SeekFrom::Start(offset as u64)).is_err() {
            return 0;
        }
        read_full(&mut self.file, buf).unwrap_or(0)
    }
}

/// [`RequestFs`] over the host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRequestFiles;

impl RequestFs for FsRequestFiles {
    type File = FsRequestFile;

    fn open(&mut self, path: &str) -> Option<FsRequestFile> {
        let file = File::open(path).ok()?;
        let len = usize::try_from(file.metadata().ok()?.len()).ok()?;
        Some(FsRequestFile { file, len })
    }
}
