//! Logic device controller.
//!
//! Sequences the bus hand-off between the panel driver and the FPGA and
//! tracks device/interrupt state so the launcher can audit its teardown.

use iceboot_display::{PanelDriver, Surface};
use tracing::{debug, info, warn};

use crate::hal::{Delay, Ice40Bus, IrqLine};
use crate::{DeviceError, Result};

/// Settle time between panel deselect and the FPGA taking the bus.
///
/// Required by the panel controller's reset timing.
pub const DEFAULT_SETTLE_MS: u32 = 200;

/// What a running image may do with the device.
///
/// Handed to host routines as `&mut dyn LogicDevice`; power and interrupt
/// arming stay with the controller's owner.
pub trait LogicDevice {
    /// Write-only SPI transfer.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Full-duplex SPI transfer, in place.
    fn transaction(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Wait up to `timeout_ms` for the device interrupt.
    ///
    /// Always `false` while interrupts are not armed.
    fn wait_irq(&mut self, timeout_ms: u32) -> bool;
}

/// Exclusive owner of the FPGA and its interrupt line.
pub struct DeviceController<B, I, D> {
    bus: B,
    irq: I,
    delay: D,
    settle_ms: u32,
    enabled: bool,
    irq_armed: bool,
}

impl<B: Ice40Bus, I: IrqLine, D: Delay> DeviceController<B, I, D> {
    pub fn new(bus: B, irq: I, delay: D) -> Self {
        Self {
            bus,
            irq,
            delay,
            settle_ms: DEFAULT_SETTLE_MS,
            enabled: false,
            irq_armed: false,
        }
    }

    /// Override the panel settle interval.
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    pub fn settle_ms(&self) -> u32 {
        self.settle_ms
    }

    /// Boot-time hardware bring-up.
    pub fn init(&mut self) -> Result<()> {
        self.bus.init()?;
        info!("FPGA driver initialized");
        Ok(())
    }

    /// Take the bus away from the panel driver and let it settle.
    pub fn disable_panel_output<P: PanelDriver>(&mut self, surface: &mut Surface<P>) -> Result<()> {
        surface.release_bus()?;
        self.delay.delay_ms(self.settle_ms);
        Ok(())
    }

    /// Route the panel to the device so the image can drive it.
    pub fn enable_panel_output<P: PanelDriver>(&mut self, surface: &mut Surface<P>) -> Result<()> {
        surface.route_to_device()?;
        Ok(())
    }

    /// Stream a bitstream into the device.
    ///
    /// The device counts as enabled from the first attempt on, so the caller
    /// must `disable()` afterwards regardless of the outcome. Never retried.
    pub fn load_bitstream(&mut self, bitstream: &[u8]) -> Result<()> {
        if bitstream.is_empty() {
            return Err(DeviceError::EmptyBitstream);
        }
        self.enabled = true;
        debug!(bytes = bitstream.len(), "loading bitstream");
        match self.bus.load_bitstream(bitstream) {
            Ok(()) => {
                info!(bytes = bitstream.len(), "bitstream loaded");
                Ok(())
            }
            Err(err) => {
                warn!(%err, "bitstream load failed");
                Err(err)
            }
        }
    }

    /// Arm the device interrupt for the duration of a host routine.
    pub fn setup_interrupts(&mut self) -> Result<()> {
        self.irq.arm()?;
        self.irq_armed = true;
        debug!("FPGA irq armed");
        Ok(())
    }

    /// Disarm the device interrupt. No-op if not armed.
    pub fn teardown_interrupts(&mut self) {
        if self.irq_armed {
            self.irq.disarm();
            self.irq_armed = false;
            debug!("FPGA irq disarmed");
        }
    }

    /// Power down / deselect the device.
    pub fn disable(&mut self) {
        self.bus.disable();
        self.enabled = false;
        debug!("FPGA disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn irq_armed(&self) -> bool {
        self.irq_armed
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn irq(&self) -> &I {
        &self.irq
    }
}

impl<B: Ice40Bus, I: IrqLine, D: Delay> LogicDevice for DeviceController<B, I, D> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.enabled {
            return Err(DeviceError::Disabled);
        }
        self.bus.send(data)
    }

    fn transaction(&mut self, buf: &mut [u8]) -> Result<()> {
        if !self.enabled {
            return Err(DeviceError::Disabled);
        }
        self.bus.transaction(buf)
    }

    fn wait_irq(&mut self, timeout_ms: u32) -> bool {
        self.irq_armed && self.irq.wait(timeout_ms)
    }
}
