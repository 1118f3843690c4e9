//! Core type definitions for the display crate.

/// Panel width in pixels.
pub const WIDTH: u32 = 320;

/// Panel height in pixels.
pub const HEIGHT: u32 = 240;

/// Number of pixels in one frame.
pub const PIXELS: usize = (WIDTH * HEIGHT) as usize;

/// Who currently drives the shared panel bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Panel driver initialized; the host may flush frames.
    Active,
    /// Panel driver de-initialized and deselected; nobody drives the bus.
    Released,
    /// Panel input routed to the logic device.
    Routed,
}

/// Text size schedule used by the fixed-layout screens.
///
/// Sizes are nominal pixel heights; they map onto the closest mono font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    /// 18 px body text.
    Body,
    /// 23 px headline, used for the first line of a fatal screen.
    Headline,
}

impl TextSize {
    /// Nominal height in pixels.
    pub const fn px(self) -> u32 {
        match self {
            TextSize::Body => 18,
            TextSize::Headline => 23,
        }
    }
}
