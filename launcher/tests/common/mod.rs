//! Recording fakes shared by the launcher integration tests.
//!
//! Every fake appends to one journal so tests can assert on the global order
//! of hardware and storage calls.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use iceboot_channel::{channel, Receiver, Sender};
use iceboot_display::{DisplayError, PanelDriver, Surface};
use iceboot_ice40::{Delay, DeviceController, DeviceError, Ice40Bus, IrqLine, LogicDevice};
use iceboot_launcher::{ImageRunner, LaunchContext, Mounts, SessionEnd, StorageError, StorageReader};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Journal) -> Vec<String> {
    log.borrow().clone()
}

pub fn count(log: &Journal, entry: &str) -> usize {
    log.borrow().iter().filter(|e| *e == entry).count()
}

pub fn position(log: &Journal, entry: &str) -> Option<usize> {
    log.borrow().iter().position(|e| e == entry)
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

pub struct MemHandle {
    path: PathBuf,
    data: Vec<u8>,
}

/// Buffer that journals its own release.
pub struct TrackedBuffer {
    data: Vec<u8>,
    log: Journal,
}

impl AsRef<[u8]> for TrackedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for TrackedBuffer {
    fn drop(&mut self) {
        self.log.borrow_mut().push("buffer.free".into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFault {
    None,
    /// `load_to_memory` reports a short read.
    ShortRead,
    /// `load_to_memory` silently hands back a truncated buffer.
    Truncate,
}

pub struct MemStorage {
    pub log: Journal,
    pub files: HashMap<PathBuf, Vec<u8>>,
    pub fault: ReadFault,
}

impl MemStorage {
    pub fn new(log: &Journal) -> Self {
        Self {
            log: log.clone(),
            files: HashMap::new(),
            fault: ReadFault::None,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, data: &[u8]) -> Self {
        self.files.insert(path.into(), data.to_vec());
        self
    }
}

impl StorageReader for MemStorage {
    type Handle = MemHandle;
    type Buffer = TrackedBuffer;

    fn open(&mut self, path: &Path) -> Result<MemHandle, StorageError> {
        self.log
            .borrow_mut()
            .push(format!("storage.open({})", path.display()));
        match self.files.get(path) {
            Some(data) => Ok(MemHandle {
                path: path.to_path_buf(),
                data: data.clone(),
            }),
            None => Err(StorageError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn size(&mut self, handle: &mut MemHandle) -> Result<usize, StorageError> {
        Ok(handle.data.len())
    }

    fn load_to_memory(&mut self, handle: &mut MemHandle) -> Result<TrackedBuffer, StorageError> {
        let size = handle.data.len();
        match self.fault {
            ReadFault::ShortRead => Err(StorageError::ShortRead {
                path: handle.path.clone(),
                expected: size,
                actual: size / 2,
            }),
            ReadFault::Truncate => {
                self.log.borrow_mut().push(format!("buffer.alloc({})", size / 2));
                Ok(TrackedBuffer {
                    data: handle.data[..size / 2].to_vec(),
                    log: self.log.clone(),
                })
            }
            ReadFault::None => {
                self.log.borrow_mut().push(format!("buffer.alloc({size})"));
                Ok(TrackedBuffer {
                    data: handle.data.clone(),
                    log: self.log.clone(),
                })
            }
        }
    }

    fn close(&mut self, _handle: MemHandle) {
        self.log.borrow_mut().push("storage.close".into());
    }
}

// ---------------------------------------------------------------------------
// Hardware
// ---------------------------------------------------------------------------

pub struct FakeBus {
    pub log: Journal,
    pub fail_init: bool,
    pub fail_load: bool,
}

impl FakeBus {
    pub fn new(log: &Journal) -> Self {
        Self {
            log: log.clone(),
            fail_init: false,
            fail_load: false,
        }
    }
}

impl Ice40Bus for FakeBus {
    fn init(&mut self) -> Result<(), DeviceError> {
        self.log.borrow_mut().push("bus.init".into());
        if self.fail_init {
            Err(DeviceError::Init("spi bus"))
        } else {
            Ok(())
        }
    }

    fn load_bitstream(&mut self, bitstream: &[u8]) -> Result<(), DeviceError> {
        self.log
            .borrow_mut()
            .push(format!("bus.load({})", bitstream.len()));
        if self.fail_load {
            Err(DeviceError::NotConfigured)
        } else {
            Ok(())
        }
    }

    fn disable(&mut self) {
        self.log.borrow_mut().push("bus.disable".into());
    }

    fn send(&mut self, _data: &[u8]) -> Result<(), DeviceError> {
        self.log.borrow_mut().push("bus.send".into());
        Ok(())
    }

    fn transaction(&mut self, buf: &mut [u8]) -> Result<(), DeviceError> {
        buf.fill(0);
        Ok(())
    }
}

pub struct FakeIrq {
    pub log: Journal,
    pub fail_arm: bool,
}

impl FakeIrq {
    pub fn new(log: &Journal) -> Self {
        Self {
            log: log.clone(),
            fail_arm: false,
        }
    }
}

impl IrqLine for FakeIrq {
    fn arm(&mut self) -> Result<(), DeviceError> {
        if self.fail_arm {
            return Err(DeviceError::Irq("no isr service"));
        }
        self.log.borrow_mut().push("irq.arm".into());
        Ok(())
    }

    fn disarm(&mut self) {
        self.log.borrow_mut().push("irq.disarm".into());
    }

    fn wait(&mut self, _timeout_ms: u32) -> bool {
        false
    }
}

pub struct FakeDelay {
    pub log: Journal,
}

impl Delay for FakeDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(format!("delay({ms})"));
    }
}

/// `fail_init` is shared so a test can break re-init after the rig is built.
pub struct FakePanel {
    pub log: Journal,
    pub fail_init: Rc<Cell<bool>>,
}

impl PanelDriver for FakePanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        if self.fail_init.get() {
            self.log.borrow_mut().push("panel.init_failed".into());
            return Err(DisplayError::Bus("panel did not answer"));
        }
        self.log.borrow_mut().push("panel.init".into());
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), DisplayError> {
        self.log.borrow_mut().push("panel.deinit".into());
        Ok(())
    }

    fn select(&mut self, to_device: bool) -> Result<(), DisplayError> {
        self.log
            .borrow_mut()
            .push(format!("panel.select({to_device})"));
        Ok(())
    }

    fn write(&mut self, _frame: &[u16]) -> Result<(), DisplayError> {
        self.log.borrow_mut().push("panel.write".into());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Host routine and mounts
// ---------------------------------------------------------------------------

/// Journals each call and checks the device is usable while it runs.
pub struct RecordingRunner {
    pub log: Journal,
    pub end: SessionEnd,
}

impl RecordingRunner {
    pub fn new(log: &Journal) -> Self {
        Self {
            log: log.clone(),
            end: SessionEnd::Completed,
        }
    }
}

impl ImageRunner for RecordingRunner {
    fn run(
        &mut self,
        _buttons: &mut Receiver,
        device: &mut dyn LogicDevice,
        uart_enabled: bool,
        path: &Path,
    ) -> SessionEnd {
        self.log
            .borrow_mut()
            .push(format!("runner.run({}, {uart_enabled})", path.display()));
        if device.send(&[0]).is_err() {
            self.log.borrow_mut().push("runner.device_unusable".into());
        }
        self.end.clone()
    }
}

pub struct FakeMounts {
    pub log: Journal,
    pub internal_ok: bool,
    pub sd_ok: bool,
}

impl FakeMounts {
    pub fn new(log: &Journal) -> Self {
        Self {
            log: log.clone(),
            internal_ok: true,
            sd_ok: true,
        }
    }

    fn result(ok: bool, root: &str) -> Result<(), StorageError> {
        if ok {
            Ok(())
        } else {
            Err(StorageError::Mount {
                root: PathBuf::from(root),
                reason: String::from("no filesystem"),
            })
        }
    }
}

impl Mounts for FakeMounts {
    fn mount_internal(&mut self) -> Result<(), StorageError> {
        self.log.borrow_mut().push("mount.flash".into());
        Self::result(self.internal_ok, "/flash")
    }

    fn mount_sdcard(&mut self) -> Result<(), StorageError> {
        self.log.borrow_mut().push("mount.sd".into());
        Self::result(self.sd_ok, "/sd")
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

pub type TestContext = LaunchContext<MemStorage, FakePanel, FakeBus, FakeIrq, FakeDelay>;

pub struct Rig {
    pub ctx: TestContext,
    pub buttons: Sender,
    pub log: Journal,
    pub panel_fails: Rc<Cell<bool>>,
}

/// Build a context over `storage`, then clear the journal of setup calls.
pub fn rig_with(log: &Journal, storage: MemStorage, bus: FakeBus, irq: FakeIrq) -> Rig {
    let panel_fails = Rc::new(Cell::new(false));
    let panel = FakePanel {
        log: log.clone(),
        fail_init: panel_fails.clone(),
    };
    let surface = Surface::new(panel).unwrap();
    let device = DeviceController::new(bus, irq, FakeDelay { log: log.clone() });
    let (buttons, receiver) = channel(16);
    let ctx = LaunchContext::new(storage, surface, device, receiver);
    log.borrow_mut().clear();
    Rig {
        ctx,
        buttons,
        log: log.clone(),
        panel_fails,
    }
}

pub fn rig(log: &Journal, storage: MemStorage) -> Rig {
    rig_with(log, storage, FakeBus::new(log), FakeIrq::new(log))
}
