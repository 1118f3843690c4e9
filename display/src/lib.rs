//! iceboot display crate
//!
//! Owns the process-wide framebuffer and the panel driver that shares its
//! SPI bus with the FPGA.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Surface                    │
//! │   (framebuffer + panel ownership tracking)  │
//! └─────────────────────────────────────────────┘
//!          │                         │
//!          ▼                         ▼
//! ┌─────────────────┐       ┌─────────────────┐
//! │   Framebuffer   │       │   PanelDriver   │
//! │ 320x240 RGB565  │       │  (board trait)  │
//! │  DrawTarget     │       │ init / deinit / │
//! └─────────────────┘       │ select / write  │
//!                           └─────────────────┘
//! ```
//!
//! The bus has exactly one owner at a time. The [`Surface`] tracks who that
//! is ([`PanelState`]) and refuses to flush while the panel is released or
//! routed to the logic device.

#![no_std]

extern crate alloc;

pub mod colors;
pub mod framebuffer;
pub mod panel;
pub mod surface;
pub mod types;

pub use colors::*;
pub use framebuffer::Framebuffer;
pub use panel::PanelDriver;
pub use surface::Surface;
pub use types::*;

/// Errors raised by the display stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// A flush was attempted while the panel bus belonged to someone else.
    #[error("panel bus not owned by the host (state: {0:?})")]
    PanelNotOwned(PanelState),
    /// The panel driver reported a bus-level failure.
    #[error("panel bus error: {0}")]
    Bus(&'static str),
    /// The frame handed to the panel does not match the panel geometry.
    #[error("frame size mismatch: expected {expected} pixels, got {actual}")]
    FrameSize { expected: usize, actual: usize },
}

pub type Result<T> = core::result::Result<T, DisplayError>;
