//! iceboot bench binary
//!
//! Runs the boot sequence against host directories and simulated hardware.
//! Buttons come from stdin, one word per line (`a`, `b`, `up`, `start`, ...).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use iceboot_channel::{channel, DEFAULT_CAPACITY};
use iceboot_display::Surface;
use iceboot_ice40::DeviceController;
use iceboot_launcher::bench::{idle_sleep, spawn_stdin_buttons, SimIce40, SimIrq, SimPanel, StdDelay};
use iceboot_launcher::config::DEFAULT_CONFIG_FILE;
use iceboot_launcher::{boot, logging, Config, DirMounts, FsStorage, LaunchContext};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "iceboot")]
#[command(about = "Load and run iCE40 images on a bench setup", long_about = None)]
struct Args {
    /// Configuration file (defaults apply if it does not exist)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory standing in for the internal flash
    #[arg(long)]
    flash_root: Option<PathBuf>,

    /// Directory standing in for the SD card
    #[arg(long)]
    sd_root: Option<PathBuf>,

    /// Only boot the named image (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let mut config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(root) = args.flash_root {
        config.storage.flash_root = root;
    }
    if let Some(root) = args.sd_root {
        config.storage.sd_root = root;
    }

    let mut images = match config.descriptors(&args.images) {
        Ok(images) => images,
        Err(err) => {
            error!(%err, "invalid image selection");
            return ExitCode::FAILURE;
        }
    };

    let (sender, mut receiver) = channel(DEFAULT_CAPACITY);
    receiver.set_idle(idle_sleep);
    if let Err(err) = spawn_stdin_buttons(sender) {
        error!(%err, "cannot start button reader");
        return ExitCode::FAILURE;
    }

    let surface = match Surface::new(SimPanel::default()) {
        Ok(surface) => surface,
        Err(err) => {
            error!(%err, "display init failed");
            return ExitCode::FAILURE;
        }
    };
    let device = DeviceController::new(SimIce40::default(), SimIrq::new(), StdDelay)
        .with_settle_ms(config.settle_ms);
    let mut ctx = LaunchContext::new(FsStorage::new(), surface, device, receiver);
    let mut mounts = DirMounts::new(&config.storage.flash_root, &config.storage.sd_root);

    info!(images = images.len(), "booting");
    match boot(&mut ctx, &mut mounts, &mut images) {
        Ok(report) => {
            for cycle in &report.cycles {
                match cycle.error() {
                    Some(err) => warn!(image = %cycle.image, %err, "image failed"),
                    None => info!(image = %cycle.image, "image finished"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "boot halted");
            ExitCode::FAILURE
        }
    }
}
