//! The process-wide display surface.

use embedded_graphics::pixelcolor::Rgb565;
use tracing::{debug, trace};

use crate::framebuffer::Framebuffer;
use crate::panel::PanelDriver;
use crate::types::{PanelState, TextSize};
use crate::{DisplayError, Result};

/// Framebuffer plus exclusive ownership of the panel driver.
pub struct Surface<P> {
    fb: Framebuffer,
    panel: P,
    state: PanelState,
}

impl<P: PanelDriver> Surface<P> {
    /// Take ownership of `panel` and initialize it.
    pub fn new(mut panel: P) -> Result<Self> {
        panel.init()?;
        Ok(Self {
            fb: Framebuffer::new(),
            panel,
            state: PanelState::Active,
        })
    }

    /// Current bus owner.
    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Clear the framebuffer to `color`.
    pub fn background(&mut self, color: Rgb565) {
        self.fb.background(color);
    }

    /// Draw text into the framebuffer (no flush).
    pub fn draw_text(&mut self, color: Rgb565, size: TextSize, x: i32, y: i32, text: &str) {
        self.fb.draw_text(color, size, x, y, text);
    }

    /// Push the framebuffer to the panel.
    ///
    /// Fails without touching the bus unless the host owns the panel.
    pub fn flush(&mut self) -> Result<()> {
        if self.state != PanelState::Active {
            return Err(DisplayError::PanelNotOwned(self.state));
        }
        trace!("panel flush");
        self.panel.write(self.fb.pixels())
    }

    /// De-initialize and deselect the panel so the bus is free.
    pub fn release_bus(&mut self) -> Result<()> {
        self.panel.deinit()?;
        self.panel.select(false)?;
        self.state = PanelState::Released;
        debug!("panel bus released");
        Ok(())
    }

    /// Route the panel input to the logic device.
    ///
    /// Only valid once the bus has been released.
    pub fn route_to_device(&mut self) -> Result<()> {
        if self.state != PanelState::Released {
            return Err(DisplayError::PanelNotOwned(self.state));
        }
        self.panel.select(true)?;
        self.state = PanelState::Routed;
        debug!("panel routed to logic device");
        Ok(())
    }

    /// Re-initialize the panel driver and take the bus back.
    pub fn reinit(&mut self) -> Result<()> {
        self.panel.init()?;
        self.state = PanelState::Active;
        debug!("panel re-initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct FakePanel {
        calls: Vec<&'static str>,
        frames: usize,
    }

    impl PanelDriver for FakePanel {
        fn init(&mut self) -> Result<()> {
            self.calls.push("init");
            Ok(())
        }
        fn deinit(&mut self) -> Result<()> {
            self.calls.push("deinit");
            Ok(())
        }
        fn select(&mut self, to_device: bool) -> Result<()> {
            self.calls.push(if to_device { "select(true)" } else { "select(false)" });
            Ok(())
        }
        fn write(&mut self, frame: &[u16]) -> Result<()> {
            assert_eq!(frame.len(), crate::PIXELS);
            self.frames += 1;
            Ok(())
        }
    }

    #[test]
    fn test_new_initializes_panel() {
        let surface = Surface::new(FakePanel::default()).unwrap();
        assert_eq!(surface.state(), PanelState::Active);
        assert_eq!(surface.panel().calls, ["init"]);
    }

    #[test]
    fn test_handoff_sequence() {
        let mut surface = Surface::new(FakePanel::default()).unwrap();
        surface.release_bus().unwrap();
        surface.route_to_device().unwrap();
        assert_eq!(surface.state(), PanelState::Routed);
        surface.reinit().unwrap();
        assert_eq!(
            surface.panel().calls,
            ["init", "deinit", "select(false)", "select(true)", "init"]
        );
    }

    #[test]
    fn test_flush_refused_while_routed() {
        let mut surface = Surface::new(FakePanel::default()).unwrap();
        surface.release_bus().unwrap();
        assert_eq!(
            surface.flush(),
            Err(DisplayError::PanelNotOwned(PanelState::Released))
        );
        surface.route_to_device().unwrap();
        assert_eq!(
            surface.flush(),
            Err(DisplayError::PanelNotOwned(PanelState::Routed))
        );
        assert_eq!(surface.panel().frames, 0);
    }

    #[test]
    fn test_route_requires_release() {
        let mut surface = Surface::new(FakePanel::default()).unwrap();
        assert!(surface.route_to_device().is_err());
        surface.flush().unwrap();
        assert_eq!(surface.panel().frames, 1);
    }
}
