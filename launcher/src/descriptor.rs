//! Image descriptors and the host routine seam.

use std::path::{Path, PathBuf};

use iceboot_channel::Receiver;
use iceboot_ice40::{DeviceError, LogicDevice};

/// File every image directory must contain.
pub const BITSTREAM_FILE: &str = "bitstream.bin";

/// How a host routine session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The routine finished its work.
    Completed,
    /// Every button producer went away.
    ChannelClosed,
    /// Forwarding a button report to the device failed.
    ButtonFault(DeviceError),
    /// Serving a device file request failed.
    RequestFault(DeviceError),
}

impl SessionEnd {
    /// Device error that ended the session, if any.
    pub fn fault(&self) -> Option<&DeviceError> {
        match self {
            SessionEnd::ButtonFault(err) | SessionEnd::RequestFault(err) => Some(err),
            SessionEnd::Completed | SessionEnd::ChannelClosed => None,
        }
    }
}

/// Code that runs on the host while an image is active.
///
/// Called synchronously with interrupts armed; returning ends the session.
pub trait ImageRunner {
    fn run(
        &mut self,
        buttons: &mut Receiver,
        device: &mut dyn LogicDevice,
        uart_enabled: bool,
        path: &Path,
    ) -> SessionEnd;
}

/// One image: a directory holding `bitstream.bin` plus its host routine.
#[derive(Debug, Clone)]
pub struct ImageDescriptor<R> {
    name: String,
    dir: PathBuf,
    runner: R,
}

impl<R: ImageRunner> ImageDescriptor<R> {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            runner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image directory, handed to the host routine as its file prefix.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn bitstream_path(&self) -> PathBuf {
        self.dir.join(BITSTREAM_FILE)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }
}
