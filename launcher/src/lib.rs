//! iceboot launcher
//!
//! Boots the badge, then loads each configured FPGA image and hands control
//! to its host routine, recovering to a known state whatever happens.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  boot: FPGA init · flash mount · sd mount · image list   │
//! └──────────────────────────────────────────────────────────┘
//!                            │ per image
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                     LaunchContext                        │
//! │  Idle → Opening → Loading → Running → Teardown → Idle    │
//! └──────────────────────────────────────────────────────────┘
//!     │             │               │               │
//!     ▼             ▼               ▼               ▼
//! ┌─────────┐ ┌───────────┐ ┌──────────────┐ ┌─────────────┐
//! │ Storage │ │  Surface  │ │  Device      │ │ ImageRunner │
//! │ Reader  │ │ + report  │ │  Controller  │ │ (host side) │
//! └─────────┘ └───────────┘ └──────────────┘ └─────────────┘
//! ```
//!
//! Boot failures are fatal and end on the fatal screen. Cycle failures are
//! shown with a go-back prompt and the next image is launched.

pub mod bench;
pub mod boot;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod mounts;
pub mod orchestrator;
pub mod report;
pub mod runners;
pub mod storage;

pub use boot::{boot, BootReport};
pub use config::Config;
pub use descriptor::{ImageDescriptor, ImageRunner, SessionEnd, BITSTREAM_FILE};
pub use error::{BootError, ConfigError, LaunchError, ReportError, StorageError};
pub use mounts::{DirMounts, Mounts};
pub use orchestrator::{CycleOutcome, CycleReport, LaunchContext, LaunchState};
pub use runners::RunnerKind;
pub use storage::{Bitstream, FsStorage, StorageReader};
