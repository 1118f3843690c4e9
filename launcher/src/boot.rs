//! Boot sequence.
//!
//! FPGA bring-up and the internal flash mount are fatal on failure: the
//! fatal screen is shown and boot stops. The SD card is optional. Once both
//! required steps pass, every configured image is launched in order.

use iceboot_display::PanelDriver;
use iceboot_ice40::{Delay, Ice40Bus, IrqLine};
use tracing::{error, info, warn};

use crate::descriptor::{ImageDescriptor, ImageRunner};
use crate::error::BootError;
use crate::mounts::Mounts;
use crate::orchestrator::{CycleReport, LaunchContext};
use crate::report::{FLASH_FAILURE, HARDWARE_FAILURE};
use crate::storage::StorageReader;

/// What a completed boot did.
#[derive(Debug)]
pub struct BootReport {
    pub sd_mounted: bool,
    /// One report per image, in launch order.
    pub cycles: Vec<CycleReport>,
}

pub fn boot<S, P, B, I, D, M, R>(
    ctx: &mut LaunchContext<S, P, B, I, D>,
    mounts: &mut M,
    images: &mut [ImageDescriptor<R>],
) -> Result<BootReport, BootError>
where
    S: StorageReader,
    P: PanelDriver,
    B: Ice40Bus,
    I: IrqLine,
    D: Delay,
    M: Mounts,
    R: ImageRunner,
{
    if let Err(err) = ctx.init_device() {
        error!(%err, "failed to initialize the iCE40 FPGA");
        ctx.show_fatal(HARDWARE_FAILURE);
        return Err(BootError::HardwareInit(err));
    }

    if let Err(err) = mounts.mount_internal() {
        error!(%err, "failed to mount internal flash");
        ctx.show_fatal(FLASH_FAILURE);
        return Err(BootError::FlashMount(err));
    }

    let sd_mounted = match mounts.mount_sdcard() {
        Ok(()) => {
            info!("SD card filesystem mounted");
            true
        }
        Err(err) => {
            warn!(%err, "SD card not mounted");
            false
        }
    };

    let mut cycles = Vec::with_capacity(images.len());
    for image in images.iter_mut() {
        cycles.push(ctx.start(image));
    }

    Ok(BootReport { sd_mounted, cycles })
}
