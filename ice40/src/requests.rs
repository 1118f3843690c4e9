//! File read requests issued by the running image.
//!
//! The bitstream raises its interrupt, the host polls the status byte, and
//! if a read is pending it fetches `(file id, offset, length)` and answers
//! with the data. File `N` maps to `<prefix>/fpga_NNNNNNNN.dat`; files stay
//! open for the rest of the session once the device has asked for them.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::controller::LogicDevice;
use crate::protocol::{FileReadRequest, CMD_FREAD_GET, CMD_FREAD_PUT, CMD_NOP2, CMD_RESP_ACK, REQ_FREAD};
use crate::Result;

/// Random-access file opened on behalf of the device.
pub trait RequestFile {
    /// File length in bytes.
    fn len(&self) -> usize;

    /// Read up to `buf.len()` bytes at `offset`. Returns the count read.
    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Filesystem the request server opens files from.
pub trait RequestFs {
    type File: RequestFile;

    fn open(&mut self, path: &str) -> Option<Self::File>;
}

struct Entry<F> {
    fid: u32,
    file: F,
}

/// Serves device file reads for one image session.
pub struct FileRequestServer<FS: RequestFs> {
    fs: FS,
    prefix: String,
    entries: Vec<Entry<FS::File>>,
}

impl<FS: RequestFs> FileRequestServer<FS> {
    /// `prefix` is the image directory.
    pub fn new(fs: FS, prefix: &str) -> Self {
        Self {
            fs,
            prefix: String::from(prefix),
            entries: Vec::new(),
        }
    }

    /// On-disk path for a file id.
    pub fn default_path(&self, fid: u32) -> String {
        format!("{}/fpga_{:08x}.dat", self.prefix, fid)
    }

    fn entry(&mut self, fid: u32) -> Option<&mut Entry<FS::File>> {
        if let Some(idx) = self.entries.iter().position(|e| e.fid == fid) {
            return Some(&mut self.entries[idx]);
        }
        let path = self.default_path(fid);
        debug!(%path, "FPGA read file");
        let file = self.fs.open(&path)?;
        self.entries.push(Entry { fid, file });
        self.entries.last_mut()
    }

    /// Fill `buf` from `fid` at `offset`.
    ///
    /// Missing files and bytes past the end read as zero. Returns how many
    /// bytes came from the file.
    pub fn read(&mut self, fid: u32, offset: usize, buf: &mut [u8]) -> usize {
        let Some(entry) = self.entry(fid) else {
            buf.fill(0);
            return 0;
        };

        let len = entry.file.len();
        if offset >= len {
            buf.fill(0);
            return 0;
        }

        let avail = (len - offset).min(buf.len());
        let (head, tail) = buf.split_at_mut(avail);
        tail.fill(0);

        entry.file.read_at(offset, head)
    }

    /// Handle at most one pending device request.
    ///
    /// Returns `Ok(false)` if the interrupt did not fire within `wait_ms`.
    pub fn process(&mut self, device: &mut dyn LogicDevice, wait_ms: u32) -> Result<bool> {
        if !device.wait_irq(wait_ms) {
            return Ok(false);
        }

        let mut status = [CMD_NOP2, 0];
        device.transaction(&mut status)?;
        let req = status[1] & 0x0f;

        if req & REQ_FREAD != 0 {
            device.send(&[CMD_FREAD_GET])?;

            let mut wire = [0u8; FileReadRequest::WIRE_LEN];
            wire[0] = CMD_RESP_ACK;
            device.transaction(&mut wire)?;
            let request = FileReadRequest::decode(&wire);
            trace!(?request, "FPGA file read");

            let mut reply = vec![0u8; request.length + 1];
            reply[0] = CMD_FREAD_PUT;
            self.read(request.file_id, request.offset as usize, &mut reply[1..]);
            device.send(&reply)?;
        }

        Ok(true)
    }
}
