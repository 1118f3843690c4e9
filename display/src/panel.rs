//! Board-level panel driver seam.
//!
//! The panel controller sits on the same SPI bus as the FPGA. Boards provide
//! an implementation; the [`Surface`](crate::Surface) sequences the calls.

use crate::Result;

/// Panel controller driver (ILI9341-class).
pub trait PanelDriver {
    /// Reset and configure the controller. Leaves the host driving the panel.
    fn init(&mut self) -> Result<()>;

    /// Stop driving the controller and release the bus.
    fn deinit(&mut self) -> Result<()>;

    /// Drive the panel mode line.
    ///
    /// `true` routes the panel input to the logic device, `false` deselects.
    fn select(&mut self, to_device: bool) -> Result<()>;

    /// Push one full frame of RGB565 pixels.
    fn write(&mut self, frame: &[u16]) -> Result<()>;
}

impl<P: PanelDriver + ?Sized> PanelDriver for &mut P {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn deinit(&mut self) -> Result<()> {
        (**self).deinit()
    }

    fn select(&mut self, to_device: bool) -> Result<()> {
        (**self).select(to_device)
    }

    fn write(&mut self, frame: &[u16]) -> Result<()> {
        (**self).write(frame)
    }
}
