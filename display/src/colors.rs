//! 24-bit RGB to RGB565 conversion and the fixed screen palette.

use embedded_graphics::pixelcolor::Rgb565;

/// Convert a `0xRRGGBB` value (alpha byte ignored) to RGB565.
pub const fn rgb888(value: u32) -> Rgb565 {
    let r = ((value >> 16) & 0xff) as u8;
    let g = ((value >> 8) & 0xff) as u8;
    let b = (value & 0xff) as u8;
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

/// Background of the fatal error screen.
pub const FATAL_BACKGROUND: Rgb565 = rgb888(0xa85a32);

/// Text on the fatal error screen.
pub const FATAL_TEXT: Rgb565 = rgb888(0xffffff);

/// Background of the recoverable error screen.
pub const NOTICE_BACKGROUND: Rgb565 = rgb888(0xffffff);

/// Text on the recoverable error screen.
pub const NOTICE_TEXT: Rgb565 = rgb888(0xff0000);
