//! Launch orchestrator.
//!
//! One call to [`LaunchContext::start`] is one cycle:
//!
//! ```text
//!  Idle ─► Opening ─► Loading ─► Running ─► Teardown ─► Idle
//!             │          │  │
//!             │  short   │  │ load failed
//!             ▼  read    │  ▼
//!         FileError ◄────┘  BitstreamError
//!             │  (disable)      │ disable, panel init
//!             └──── ack ──► Idle ◄── ack ┘
//! ```
//!
//! Teardown order is fixed: interrupts off, device disabled, panel driver
//! re-initialized. A session that ended on a device fault then gets the
//! download-mode fault screen. `disable()` runs exactly once for every cycle that
//! reached `Loading`, including a short read, which leaves the panel alone.
//! The bitstream buffer never outlives the load call.

use std::path::Path;

use iceboot_channel::Receiver;
use iceboot_display::{PanelDriver, Surface};
use iceboot_ice40::{Delay, DeviceController, DeviceError, Ice40Bus, IrqLine};
use tracing::{debug, error, info, warn};

use crate::descriptor::{ImageDescriptor, ImageRunner, SessionEnd};
use crate::error::{LaunchError, ReportError, StorageError};
use crate::report;
use crate::storage::StorageReader;

/// Orchestrator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Opening,
    Loading,
    Running,
    Teardown,
    FileError,
    BitstreamError,
}

/// How a cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The image ran and its host routine returned.
    Completed(SessionEnd),
    Failed(LaunchError),
}

/// Result of one launch cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub image: String,
    /// Every state entered, in order, starting and ending at `Idle`.
    pub trace: Vec<LaunchState>,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Completed(_))
    }

    pub fn error(&self) -> Option<&LaunchError> {
        match &self.outcome {
            CycleOutcome::Failed(err) => Some(err),
            CycleOutcome::Completed(_) => None,
        }
    }
}

fn enter(trace: &mut Vec<LaunchState>, state: LaunchState) {
    debug!(?state, "launch state");
    trace.push(state);
}

/// Everything a launch cycle touches, owned for the life of the process.
pub struct LaunchContext<S, P, B, I, D> {
    storage: S,
    surface: Surface<P>,
    device: DeviceController<B, I, D>,
    buttons: Receiver,
}

impl<S, P, B, I, D> LaunchContext<S, P, B, I, D>
where
    S: StorageReader,
    P: PanelDriver,
    B: Ice40Bus,
    I: IrqLine,
    D: Delay,
{
    pub fn new(
        storage: S,
        surface: Surface<P>,
        device: DeviceController<B, I, D>,
        buttons: Receiver,
    ) -> Self {
        Self {
            storage,
            surface,
            device,
            buttons,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn surface(&self) -> &Surface<P> {
        &self.surface
    }

    pub fn device(&self) -> &DeviceController<B, I, D> {
        &self.device
    }

    pub fn buttons_mut(&mut self) -> &mut Receiver {
        &mut self.buttons
    }

    /// Boot-time FPGA bring-up.
    pub fn init_device(&mut self) -> iceboot_ice40::Result<()> {
        self.device.init()
    }

    /// Show a fatal screen. Display failures are logged.
    pub fn show_fatal(&mut self, detail: [&str; 2]) {
        if let Err(err) = report::show_boot_fatal(&mut self.surface, detail) {
            error!(%err, "cannot show fatal error screen");
        }
    }

    /// Run one image through a full cycle and return to `Idle`.
    pub fn start<R: ImageRunner>(&mut self, image: &mut ImageDescriptor<R>) -> CycleReport {
        info!(image = image.name(), dir = %image.dir().display(), "starting image");
        let mut trace = vec![LaunchState::Idle];
        let outcome = self.cycle(image, &mut trace);
        enter(&mut trace, LaunchState::Idle);
        CycleReport {
            image: image.name().to_string(),
            trace,
            outcome,
        }
    }

    fn cycle<R: ImageRunner>(
        &mut self,
        image: &mut ImageDescriptor<R>,
        trace: &mut Vec<LaunchState>,
    ) -> CycleOutcome {
        let path = image.bitstream_path();

        enter(trace, LaunchState::Opening);
        let mut handle = match self.storage.open(&path) {
            Ok(handle) => handle,
            Err(err) => return self.file_error(trace, err),
        };

        enter(trace, LaunchState::Loading);
        let loaded = self.load(&path, &mut handle);
        self.storage.close(handle);

        match loaded {
            Err(err) => {
                self.device.disable();
                return self.file_error(trace, err);
            }
            Ok(Err(err)) => return self.bitstream_error(trace, err),
            Ok(Ok(())) => {}
        }

        enter(trace, LaunchState::Running);
        if let Err(err) = self.device.setup_interrupts() {
            error!(%err, "cannot arm FPGA interrupt");
            self.teardown(trace);
            return CycleOutcome::Failed(LaunchError::Interrupts(err));
        }

        let dir = image.dir().to_path_buf();
        let end = image
            .runner_mut()
            .run(&mut self.buttons, &mut self.device, false, &dir);
        match end.fault() {
            Some(err) => warn!(%err, end = ?end, "host routine ended on device fault"),
            None => info!(end = ?end, "host routine returned"),
        }

        self.teardown(trace);
        if let Err(err) = report::show_session_fault(&mut self.surface, &end) {
            error!(%err, "cannot show device fault screen");
        }
        CycleOutcome::Completed(end)
    }

    /// Read the file into memory and stream it into the device.
    ///
    /// The outer error means the file never reached the device; the inner
    /// one is the device's verdict on the load.
    fn load(
        &mut self,
        path: &Path,
        handle: &mut S::Handle,
    ) -> Result<Result<(), DeviceError>, StorageError> {
        let size = self.storage.size(handle)?;
        let bitstream = self.storage.load_to_memory(handle)?;
        let actual = bitstream.as_ref().len();
        if actual != size {
            return Err(StorageError::ShortRead {
                path: path.to_path_buf(),
                expected: size,
                actual,
            });
        }
        debug!(bytes = size, "bitstream in memory");

        let result = self.hand_off_and_load(bitstream.as_ref());
        drop(bitstream);
        Ok(result)
    }

    fn hand_off_and_load(&mut self, bitstream: &[u8]) -> Result<(), DeviceError> {
        self.device.disable_panel_output(&mut self.surface)?;
        self.device.enable_panel_output(&mut self.surface)?;
        self.device.load_bitstream(bitstream)
    }

    fn teardown(&mut self, trace: &mut Vec<LaunchState>) {
        enter(trace, LaunchState::Teardown);
        self.device.teardown_interrupts();
        self.device.disable();
        self.reinit_panel();
    }

    fn reinit_panel(&mut self) {
        if let Err(err) = self.surface.reinit() {
            error!(%err, "panel re-init failed");
        }
    }

    fn file_error(&mut self, trace: &mut Vec<LaunchState>, err: StorageError) -> CycleOutcome {
        enter(trace, LaunchState::FileError);
        error!(%err, "failed to open image");
        self.report(report::OPEN_FAILED);
        CycleOutcome::Failed(LaunchError::File(err))
    }

    fn bitstream_error(&mut self, trace: &mut Vec<LaunchState>, err: DeviceError) -> CycleOutcome {
        enter(trace, LaunchState::BitstreamError);
        error!(%err, "failed to load bitstream");
        self.device.disable();
        self.reinit_panel();
        self.report(report::LOAD_FAILED);
        CycleOutcome::Failed(LaunchError::Bitstream(err))
    }

    fn report(&mut self, message: &str) {
        match report::show_recoverable(&mut self.surface, &mut self.buttons, message) {
            Ok(event) => debug!(?event, "error acknowledged"),
            Err(ReportError::Display(err)) => warn!(%err, "error acknowledged without a screen"),
            Err(err @ ReportError::Channel(_)) => warn!(%err, "error screen not acknowledged"),
        }
    }
}
