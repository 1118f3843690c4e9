//! `iceboot.toml` configuration.
//!
//! Every field has a default; an absent file boots the stock image list.
//! Image paths are written against the logical mount points `/flash` and
//! `/sd` and resolved onto the configured roots.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use iceboot_ice40::DEFAULT_SETTLE_MS;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::descriptor::ImageDescriptor;
use crate::error::ConfigError;
use crate::runners::{RunnerKind, DEFAULT_REQUESTS};

pub const DEFAULT_CONFIG_FILE: &str = "iceboot.toml";

const FLASH_MOUNT: &str = "/flash";
const SD_MOUNT: &str = "/sd";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Panel to device hand-off delay.
    pub settle_ms: u32,
    pub storage: StorageConfig,
    pub images: Vec<ImageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub flash_root: PathBuf,
    pub sd_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    pub name: String,
    pub path: PathBuf,
    /// `event-loop` or `request-server`.
    pub runner: String,
    /// Poll count for `request-server` images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<u32>,
}

impl ImageConfig {
    pub fn runner_kind(&self) -> Result<RunnerKind, ConfigError> {
        match self.runner.as_str() {
            "event-loop" => Ok(RunnerKind::EventLoop),
            "request-server" => Ok(RunnerKind::RequestServer {
                requests: self.requests.unwrap_or(DEFAULT_REQUESTS),
            }),
            other => Err(ConfigError::UnknownRunner {
                image: self.name.clone(),
                runner: other.to_string(),
            }),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            flash_root: PathBuf::from(FLASH_MOUNT),
            sd_root: PathBuf::from(SD_MOUNT),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            storage: StorageConfig::default(),
            images: vec![
                ImageConfig {
                    name: String::from("awlvl1"),
                    path: PathBuf::from("/sd/apps/ice40/awlvl1"),
                    runner: String::from("request-server"),
                    requests: Some(DEFAULT_REQUESTS),
                },
                ImageConfig {
                    name: String::from("aw"),
                    path: PathBuf::from("/sd/apps/ice40/aw"),
                    runner: String::from("event-loop"),
                    requests: None,
                },
            ],
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(text).map_err(|e| ConfigError::CannotParseToml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for image in &self.images {
            image.runner_kind()?;
        }
        Ok(())
    }

    /// Map a path under `/flash` or `/sd` onto the configured roots.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if let Ok(rest) = path.strip_prefix(SD_MOUNT) {
            self.storage.sd_root.join(rest)
        } else if let Ok(rest) = path.strip_prefix(FLASH_MOUNT) {
            self.storage.flash_root.join(rest)
        } else {
            path.to_path_buf()
        }
    }

    /// Descriptors for the boot list, in config order.
    ///
    /// A non-empty `only` keeps just the named images.
    pub fn descriptors(&self, only: &[String]) -> Result<Vec<ImageDescriptor<RunnerKind>>, ConfigError> {
        if let Some(missing) = only
            .iter()
            .find(|name| !self.images.iter().any(|image| &image.name == *name))
        {
            return Err(ConfigError::UnknownImage(missing.clone()));
        }

        self.images
            .iter()
            .filter(|image| only.is_empty() || only.contains(&image.name))
            .map(|image| {
                let runner = image.runner_kind()?;
                Ok(ImageDescriptor::new(
                    image.name.as_str(),
                    self.resolve(&image.path),
                    runner,
                ))
            })
            .collect()
    }
}
