//! Host bench backends for running the boot sequence off-device.
//!
//! - [`SimPanel`]: keeps the last flushed frame in memory
//! - [`SimIce40`]: accepts any non-empty bitstream, answers every transfer
//!   with zeros
//! - [`SimIrq`]: an [`IrqSignal`] nobody gives, so waits time out
//! - [`spawn_stdin_buttons`]: one press+release per stdin line

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use iceboot_channel::{ButtonEvent, Input, Sender};
use iceboot_display::{DisplayError, PanelDriver, PIXELS};
use iceboot_ice40::{Delay, DeviceError, Ice40Bus, IrqLine, IrqSignal};
use tracing::{debug, info, trace, warn};

/// In-memory panel.
#[derive(Debug, Default)]
pub struct SimPanel {
    initialized: bool,
    routed: bool,
    frames: usize,
    last_frame: Vec<u16>,
}

impl SimPanel {
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn last_frame(&self) -> &[u16] {
        &self.last_frame
    }
}

impl PanelDriver for SimPanel {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.initialized = true;
        self.routed = false;
        debug!("sim panel init");
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), DisplayError> {
        self.initialized = false;
        debug!("sim panel deinit");
        Ok(())
    }

    fn select(&mut self, to_device: bool) -> Result<(), DisplayError> {
        self.routed = to_device;
        debug!(to_device, "sim panel select");
        Ok(())
    }

    fn write(&mut self, frame: &[u16]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::Bus("panel not initialized"));
        }
        if frame.len() != PIXELS {
            return Err(DisplayError::FrameSize {
                expected: PIXELS,
                actual: frame.len(),
            });
        }
        self.last_frame.clear();
        self.last_frame.extend_from_slice(frame);
        self.frames += 1;
        trace!(frame = self.frames, "sim panel frame");
        Ok(())
    }
}

/// Simulated iCE40.
#[derive(Debug, Default)]
pub struct SimIce40 {
    configured: bool,
}

impl Ice40Bus for SimIce40 {
    fn init(&mut self) -> Result<(), DeviceError> {
        info!("sim iCE40 ready");
        Ok(())
    }

    fn load_bitstream(&mut self, bitstream: &[u8]) -> Result<(), DeviceError> {
        if bitstream.is_empty() {
            return Err(DeviceError::EmptyBitstream);
        }
        self.configured = true;
        info!(bytes = bitstream.len(), "sim iCE40 configured");
        Ok(())
    }

    fn disable(&mut self) {
        self.configured = false;
    }

    fn send(&mut self, data: &[u8]) -> Result<(), DeviceError> {
        if !self.configured {
            return Err(DeviceError::NotConfigured);
        }
        trace!(bytes = data.len(), "sim iCE40 send");
        Ok(())
    }

    fn transaction(&mut self, buf: &mut [u8]) -> Result<(), DeviceError> {
        if !self.configured {
            return Err(DeviceError::NotConfigured);
        }
        buf.fill(0);
        Ok(())
    }
}

/// Blocking delay on the host clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Pause between button queue polls while a screen waits for input.
pub const BUTTON_POLL_MS: u64 = 5;

/// Receiver idle hook: yields the core instead of spinning.
pub fn idle_sleep() {
    thread::sleep(Duration::from_millis(BUTTON_POLL_MS));
}

/// Interrupt line backed by a shared [`IrqSignal`].
pub struct SimIrq {
    signal: Arc<IrqSignal>,
    armed: bool,
}

impl SimIrq {
    pub fn new() -> Self {
        Self {
            signal: Arc::new(IrqSignal::new()),
            armed: false,
        }
    }

    /// Handle a simulated interrupt source can `give()` on.
    pub fn signal(&self) -> Arc<IrqSignal> {
        self.signal.clone()
    }
}

impl Default for SimIrq {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqLine for SimIrq {
    fn arm(&mut self) -> Result<(), DeviceError> {
        self.signal.reset();
        self.armed = true;
        Ok(())
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn wait(&mut self, timeout_ms: u32) -> bool {
        self.armed && self.signal.wait(timeout_ms, &mut StdDelay)
    }
}

/// Map a stdin word to an input.
pub fn parse_input(word: &str) -> Option<Input> {
    let input = match word.trim().to_ascii_lowercase().as_str() {
        "a" | "accept" => Input::Accept,
        "b" | "back" => Input::Back,
        "up" => Input::JoystickUp,
        "down" => Input::JoystickDown,
        "left" => Input::JoystickLeft,
        "right" => Input::JoystickRight,
        "press" => Input::JoystickPress,
        "home" => Input::Home,
        "menu" => Input::Menu,
        "select" => Input::Select,
        "start" => Input::Start,
        _ => return None,
    };
    Some(input)
}

/// Feed stdin lines into the button channel until EOF.
///
/// The sender is dropped at EOF, which ends blocking receives.
pub fn spawn_stdin_buttons(sender: Sender) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(String::from("stdin-buttons"))
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let Some(input) = parse_input(&line) else {
                    warn!(line = line.trim(), "unknown button");
                    continue;
                };
                for event in [ButtonEvent::press(input), ButtonEvent::release(input)] {
                    if let Err(err) = sender.send(event) {
                        warn!(%err, "button dropped");
                    }
                }
            }
            debug!("stdin closed");
        })
}
