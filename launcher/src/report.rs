//! Error screens.
//!
//! ```text
//!  fatal (0xa85a32, white)            recoverable (white, red)
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │ A fatal error occured   23px │   │ Failed to open file     18px │
//! │ line 1                  18px │   │                              │
//! │ line 2                  18px │   │ Press A or B to go back      │
//! │ Reset the board to ...  18px │   │                              │
//! └──────────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! A host routine that dies on a device fault gets the fatal colours with
//! two lines (`FPGA download mode`, then `BTN error: ...` or
//! `REQ error: ...`) and no wait.

use iceboot_channel::{ButtonEvent, Receiver};
use iceboot_display::{
    DisplayError, PanelDriver, Surface, TextSize, FATAL_BACKGROUND, FATAL_TEXT, NOTICE_BACKGROUND,
    NOTICE_TEXT,
};
use tracing::{debug, warn};

use crate::descriptor::SessionEnd;
use crate::error::ReportError;

pub const FATAL_ERROR: &str = "A fatal error occured";
pub const RESET_BOARD: &str = "Reset the board to try again";
pub const OPEN_FAILED: &str = "Failed to open file";
pub const LOAD_FAILED: &str = "Failed to load bitstream";
pub const PRESS_TO_GO_BACK: &str = "Press A or B to go back";
pub const DOWNLOAD_MODE: &str = "FPGA download mode";

pub const HARDWARE_FAILURE: [&str; 2] = ["A hardware failure occured", "while initializing the FPGA"];
pub const FLASH_FAILURE: [&str; 2] = ["Failed to initialize flash FS", "Flash may be corrupted"];

/// Vertical distance between fatal screen lines.
pub const LINE_PITCH: i32 = 20;

/// Draw the four-line fatal screen and flush. Returns immediately.
///
/// `None` lines stay blank. The first line uses the headline size.
pub fn show_fatal<P: PanelDriver>(
    surface: &mut Surface<P>,
    lines: [Option<&str>; 4],
) -> Result<(), DisplayError> {
    surface.background(FATAL_BACKGROUND);
    for (i, line) in lines.iter().enumerate() {
        let Some(text) = line else { continue };
        let size = if i == 0 {
            TextSize::Headline
        } else {
            TextSize::Body
        };
        surface.draw_text(FATAL_TEXT, size, 0, LINE_PITCH * i as i32, text);
    }
    surface.flush()
}

/// Standard fatal screen: headline, two detail lines, reset hint.
pub fn show_boot_fatal<P: PanelDriver>(
    surface: &mut Surface<P>,
    detail: [&str; 2],
) -> Result<(), DisplayError> {
    show_fatal(
        surface,
        [
            Some(FATAL_ERROR),
            Some(detail[0]),
            Some(detail[1]),
            Some(RESET_BOARD),
        ],
    )
}

/// Show the download-mode fault screen if `end` is a device fault.
///
/// Returns `Ok(false)` without drawing for any other session end.
pub fn show_session_fault<P: PanelDriver>(
    surface: &mut Surface<P>,
    end: &SessionEnd,
) -> Result<bool, DisplayError> {
    let detail = match end {
        SessionEnd::ButtonFault(err) => format!("BTN error: {err}"),
        SessionEnd::RequestFault(err) => format!("REQ error: {err}"),
        SessionEnd::Completed | SessionEnd::ChannelClosed => return Ok(false),
    };
    show_fatal(surface, [Some(DOWNLOAD_MODE), Some(&detail), None, None])?;
    Ok(true)
}

/// Show `message` with the go-back prompt, then block until A or B.
///
/// The wait happens even if the panel could not be flushed; the flush error
/// is returned after the acknowledge.
pub fn show_recoverable<P: PanelDriver>(
    surface: &mut Surface<P>,
    buttons: &mut Receiver,
    message: &str,
) -> Result<ButtonEvent, ReportError> {
    surface.background(NOTICE_BACKGROUND);
    let text = format!("{message}\n\n{PRESS_TO_GO_BACK}");
    surface.draw_text(NOTICE_TEXT, TextSize::Body, 0, 0, &text);
    let flushed = surface.flush();
    if let Err(err) = &flushed {
        warn!(%err, message, "error screen not shown, waiting for acknowledge anyway");
    }

    debug!(message, "waiting for acknowledge");
    let event = buttons.wait_for_acknowledge()?;
    flushed?;
    Ok(event)
}
