//! Filesystem mounts brought up at boot.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::StorageError;

/// Internal flash and removable card mounting.
pub trait Mounts {
    /// Mount the internal flash filesystem. Failure is fatal at boot.
    fn mount_internal(&mut self) -> Result<(), StorageError>;

    /// Mount the SD card. Failure is only logged.
    fn mount_sdcard(&mut self) -> Result<(), StorageError>;
}

/// Mounts backed by host directories.
#[derive(Debug, Clone)]
pub struct DirMounts {
    flash_root: PathBuf,
    sd_root: PathBuf,
}

impl DirMounts {
    pub fn new(flash_root: impl Into<PathBuf>, sd_root: impl Into<PathBuf>) -> Self {
        Self {
            flash_root: flash_root.into(),
            sd_root: sd_root.into(),
        }
    }

    fn check(root: &Path) -> Result<(), StorageError> {
        if root.is_dir() {
            info!(root = %root.display(), "mounted");
            Ok(())
        } else {
            Err(StorageError::Mount {
                root: root.to_path_buf(),
                reason: String::from("not a directory"),
            })
        }
    }
}

impl Mounts for DirMounts {
    fn mount_internal(&mut self) -> Result<(), StorageError> {
        Self::check(&self.flash_root)
    }

    fn mount_sdcard(&mut self) -> Result<(), StorageError> {
        Self::check(&self.sd_root)
    }
}
