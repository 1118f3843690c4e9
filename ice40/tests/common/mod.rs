//! Recording fakes for the FPGA board traits.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use iceboot_display::{DisplayError, PanelDriver};
use iceboot_ice40::{Delay, DeviceError, Ice40Bus, IrqLine};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct FakeBus {
    pub log: Journal,
    pub fail_load: bool,
    /// Replies copied into successive `transaction` buffers.
    pub replies: VecDeque<Vec<u8>>,
    pub sent: Vec<Vec<u8>>,
}

impl FakeBus {
    pub fn new(log: &Journal) -> Self {
        Self {
            log: log.clone(),
            fail_load: false,
            replies: VecDeque::new(),
            sent: Vec::new(),
        }
    }
}

impl Ice40Bus for FakeBus {
    fn init(&mut self) -> Result<(), DeviceError> {
        self.log.borrow_mut().push("bus.init".into());
        Ok(())
    }

    fn load_bitstream(&mut self, bitstream: &[u8]) -> Result<(), DeviceError> {
        self.log.borrow_mut().push(format!("bus.load({})", bitstream.len()));
        if self.fail_load {
            Err(DeviceError::NotConfigured)
        } else {
            Ok(())
        }
    }

    fn disable(&mut self) {
        self.log.borrow_mut().push("bus.disable".into());
    }

    fn send(&mut self, data: &[u8]) -> Result<(), DeviceError> {
        self.sent.push(data.to_vec());
        Ok(())
    }

    fn transaction(&mut self, buf: &mut [u8]) -> Result<(), DeviceError> {
        self.sent.push(buf.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            let n = reply.len().min(buf.len());
            buf[..n].copy_from_slice(&reply[..n]);
        }
        Ok(())
    }
}

pub struct FakeIrq {
    pub log: Journal,
    pub pending: usize,
}

impl FakeIrq {
    pub fn new(log: &Journal) -> Self {
        Self {
            log: log.clone(),
            pending: 0,
        }
    }
}

impl IrqLine for FakeIrq {
    fn arm(&mut self) -> Result<(), DeviceError> {
        self.log.borrow_mut().push("irq.arm".into());
        Ok(())
    }

    fn disarm(&mut self) {
        self.log.borrow_mut().push("irq.disarm".into());
    }

    fn wait(&mut self, _timeout_ms: u32) -> bool {
        if self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
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

pub struct FakePanel {
    pub log: Journal,
}

impl PanelDriver for FakePanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.log.borrow_mut().push("panel.init".into());
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), DisplayError> {
        self.log.borrow_mut().push("panel.deinit".into());
        Ok(())
    }

    fn select(&mut self, to_device: bool) -> Result<(), DisplayError> {
        self.log.borrow_mut().push(format!("panel.select({to_device})"));
        Ok(())
    }

    fn write(&mut self, _frame: &[u16]) -> Result<(), DisplayError> {
        self.log.borrow_mut().push("panel.write".into());
        Ok(())
    }
}
