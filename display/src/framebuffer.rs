//! In-memory RGB565 framebuffer.
//!
//! The buffer is plain heap memory; nothing reaches the glass until the
//! owning [`Surface`](crate::Surface) flushes it through the panel driver.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_9X18};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::types::{TextSize, HEIGHT, PIXELS, WIDTH};

/// 320x240 16-bit framebuffer.
pub struct Framebuffer {
    pixels: Vec<u16>,
}

impl Framebuffer {
    /// Allocate a black framebuffer.
    pub fn new() -> Self {
        Self {
            pixels: vec![0; PIXELS],
        }
    }

    /// Raw pixel data in row-major order.
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Read one pixel. Out-of-bounds reads return `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        let raw = self.pixels[(y * WIDTH + x) as usize];
        Some(Rgb565::from(RawU16::new(raw)))
    }

    /// Put a single pixel. Does nothing if coordinates are out of bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if x < 0 || y < 0 || x as u32 >= WIDTH || y as u32 >= HEIGHT {
            return;
        }
        self.pixels[(y as u32 * WIDTH + x as u32) as usize] = color.into_storage();
    }

    /// Fill the whole buffer with one color.
    pub fn background(&mut self, color: Rgb565) {
        self.pixels.fill(color.into_storage());
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    ///
    /// Embedded newlines start a new line below the previous one.
    pub fn draw_text(&mut self, color: Rgb565, size: TextSize, x: i32, y: i32, text: &str) {
        let style = MonoTextStyle::new(font_for(size), color);
        // Infallible target.
        let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(self);
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn font_for(size: TextSize) -> &'static MonoFont<'static> {
    match size {
        TextSize::Body => &FONT_9X18,
        TextSize::Headline => &FONT_10X20,
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.put_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.background(color);
        Ok(())
    }
}
