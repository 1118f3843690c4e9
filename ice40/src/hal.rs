//! Board traits for the FPGA side of the bus.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::Result;

/// Raw iCE40 access: configuration port plus the user SPI port.
pub trait Ice40Bus {
    /// Configure pins and the SPI device. Called once at boot.
    fn init(&mut self) -> Result<()>;

    /// Reset the device and stream a configuration image into it.
    ///
    /// On success the device is running the image.
    fn load_bitstream(&mut self, bitstream: &[u8]) -> Result<()>;

    /// Hold the device in reset and release its chip-select.
    fn disable(&mut self);

    /// Write-only transfer.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Full-duplex transfer; `buf` is sent and overwritten with the reply.
    fn transaction(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// FPGA interrupt line (falling edge, pulled up).
pub trait IrqLine {
    /// Install the handler and enable the edge interrupt.
    fn arm(&mut self) -> Result<()>;

    /// Disable the interrupt and remove the handler.
    fn disarm(&mut self);

    /// Wait up to `timeout_ms` for the line to fire. Consumes the event.
    fn wait(&mut self, timeout_ms: u32) -> bool;
}

/// Blocking millisecond delay.
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Binary semaphore given from interrupt context and taken by the host.
///
/// Board `IrqLine` implementations hand a `&'static IrqSignal` to their ISR.
pub struct IrqSignal {
    pending: AtomicBool,
}

impl IrqSignal {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Called from the ISR.
    #[inline]
    pub fn give(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consume a pending event without waiting.
    #[inline]
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Drop any stale event (used when re-arming).
    pub fn reset(&self) {
        self.pending.store(false, Ordering::Release);
    }

    /// Poll once per millisecond for up to `timeout_ms`.
    pub fn wait(&self, timeout_ms: u32, delay: &mut impl Delay) -> bool {
        if self.take() {
            return true;
        }
        for _ in 0..timeout_ms {
            delay.delay_ms(1);
            if self.take() {
                return true;
            }
        }
        false
    }
}

impl Default for IrqSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingDelay(u32);

    impl Delay for CountingDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.0 += ms;
        }
    }

    #[test]
    fn test_signal_take_consumes() {
        let signal = IrqSignal::new();
        signal.give();
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn test_wait_times_out() {
        let signal = IrqSignal::new();
        let mut delay = CountingDelay(0);
        assert!(!signal.wait(50, &mut delay));
        assert_eq!(delay.0, 50);
    }

    #[test]
    fn test_wait_zero_timeout_sees_pending() {
        let signal = IrqSignal::new();
        signal.give();
        let mut delay = CountingDelay(0);
        assert!(signal.wait(0, &mut delay));
        assert_eq!(delay.0, 0);
    }
}
