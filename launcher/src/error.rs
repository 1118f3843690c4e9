//! Launcher error types.
//!
//! `LaunchError` is cycle-scoped: the orchestrator shows it and returns to
//! idle. `BootError` is fatal and ends the boot sequence.

use std::io;
use std::path::PathBuf;

use iceboot_channel::ChannelError;
use iceboot_display::DisplayError;
use iceboot_ice40::DeviceError;

/// Storage and mount failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{}: not found", .path.display())]
    NotFound { path: PathBuf },

    /// Fewer bytes were read than the file reported.
    #[error("{}: short read ({actual} of {expected} bytes)", .path.display())]
    ShortRead {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot allocate {0} bytes for bitstream")]
    OutOfMemory(usize),

    #[error("cannot mount {}: {reason}", .root.display())]
    Mount { root: PathBuf, reason: String },
}

/// Failure of one launch cycle. Never fatal.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to open image: {0}")]
    File(#[from] StorageError),

    #[error("failed to load bitstream: {0}")]
    Bitstream(#[source] DeviceError),

    #[error("failed to arm FPGA interrupt: {0}")]
    Interrupts(#[source] DeviceError),
}

/// Boot-time failure. The board has to be reset.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("FPGA hardware init failed: {0}")]
    HardwareInit(#[source] DeviceError),

    #[error("internal flash mount failed: {0}")]
    FlashMount(#[source] StorageError),
}

/// An error screen could not be shown or acknowledged.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML could not be parsed into the expected structure.
    #[error("toml error: {0}")]
    CannotParseToml(String),

    #[error("image `{image}`: unknown runner `{runner}`")]
    UnknownRunner { image: String, runner: String },

    #[error("no image named `{0}` in config")]
    UnknownImage(String),
}
