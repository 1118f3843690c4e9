//! iCE40 Logic Device Layer
//!
//! Owns the FPGA side of the shared SPI bus: configuration (bitstream load),
//! enable/disable, the interrupt line, and the command protocol spoken by
//! bitstreams built for the badge.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                DeviceController                    │
//! │  panel hand-off · load · irq arm/disarm · disable  │
//! └────────────────────────────────────────────────────┘
//!        │               │                 │
//!        ▼               ▼                 ▼
//!   ┌─────────┐    ┌──────────┐     ┌───────────┐
//!   │ Ice40Bus│    │ IrqLine  │     │  Delay    │   board traits
//!   └─────────┘    └──────────┘     └───────────┘
//!
//! Host routines only ever see `&mut dyn LogicDevice`:
//!   ButtonForwarder · FileRequestServer
//! ```
//!
//! # What This Crate Does NOT Do
//!
//! - Interpret bitstream contents
//! - Decide whether a failure is fatal (the launcher does)

#![no_std]

extern crate alloc;

pub mod buttons;
pub mod controller;
pub mod hal;
pub mod protocol;
pub mod requests;

pub use buttons::ButtonForwarder;
pub use controller::{DeviceController, LogicDevice, DEFAULT_SETTLE_MS};
pub use hal::{Delay, Ice40Bus, IrqLine, IrqSignal};
pub use requests::{FileRequestServer, RequestFile, RequestFs};

use iceboot_display::DisplayError;

/// Logic device failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Hardware bring-up (GPIO/SPI configuration) failed.
    #[error("FPGA hardware init failed: {0}")]
    Init(&'static str),
    /// SPI transfer failed.
    #[error("SPI transfer failed")]
    Transfer,
    /// Bitstream was sent but the device never reported configuration done.
    #[error("FPGA did not signal configuration done")]
    NotConfigured,
    /// Refused to stream an empty bitstream.
    #[error("empty bitstream")]
    EmptyBitstream,
    /// Command issued while the device is disabled.
    #[error("FPGA is disabled")]
    Disabled,
    /// Interrupt line could not be armed.
    #[error("FPGA interrupt setup failed: {0}")]
    Irq(&'static str),
    /// Panel hand-off around the transfer failed.
    #[error("panel hand-off failed: {0}")]
    Panel(#[from] DisplayError),
}

pub type Result<T> = core::result::Result<T, DeviceError>;
