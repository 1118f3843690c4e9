//! Button state reports forwarded to the running image.

use iceboot_channel::{Input, Receiver};

use crate::controller::LogicDevice;
use crate::protocol::CMD_BUTTON_REPORT;
use crate::Result;

/// Report bit for each input the bitstream cares about.
pub fn button_mask(input: Input) -> u16 {
    match input {
        Input::JoystickDown => 1 << 0,
        Input::JoystickUp => 1 << 1,
        Input::JoystickLeft => 1 << 2,
        Input::JoystickRight => 1 << 3,
        Input::JoystickPress => 1 << 4,
        Input::Home => 1 << 5,
        Input::Menu => 1 << 6,
        Input::Select => 1 << 7,
        Input::Start => 1 << 8,
        Input::Accept => 1 << 9,
        Input::Back => 1 << 10,
        Input::Other(_) => 0,
    }
}

/// Tracks the held-button bitmap and mirrors changes to the device.
#[derive(Debug, Default)]
pub struct ButtonForwarder {
    state: u16,
}

impl ButtonForwarder {
    pub const fn new() -> Self {
        Self { state: 0 }
    }

    /// Currently held buttons.
    pub fn state(&self) -> u16 {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0;
    }

    /// Drain queued events and send one report per mapped event.
    ///
    /// Returns whether any report was sent. Stops at the first SPI error,
    /// leaving the remaining events queued.
    pub fn forward(&mut self, events: &mut Receiver, device: &mut dyn LogicDevice) -> Result<bool> {
        let mut work_done = false;

        while let Some(event) = events.try_recv() {
            let mask = button_mask(event.input);
            if mask == 0 {
                continue;
            }
            work_done = true;

            if event.pressed {
                self.state |= mask;
            } else {
                self.state &= !mask;
            }

            let [state_hi, state_lo] = self.state.to_be_bytes();
            let [mask_hi, mask_lo] = mask.to_be_bytes();
            device.send(&[CMD_BUTTON_REPORT, state_hi, state_lo, mask_hi, mask_lo])?;
        }

        Ok(work_done)
    }
}
