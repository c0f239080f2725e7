//! Peripheral devices (receipt printers, barcode scanners, cloud sync).
//!
//! The engine never reaches into a compiled-in device table. A
//! [`DeviceProvider`] is chosen at startup: [`MockDevices`] for demos and
//! tests, [`LiveDevices`] for a terminal with a device registry file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pineapple_pos_core::DeviceId;

/// Errors that can occur while listing devices.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to read device registry {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid device registry {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Printer,
    Scanner,
    CloudSync,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Printer => write!(f, "printer"),
            Self::Scanner => write!(f, "scanner"),
            Self::CloudSync => write!(f, "cloud_sync"),
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "printer" => Ok(Self::Printer),
            "scanner" => Ok(Self::Scanner),
            "cloud_sync" => Ok(Self::CloudSync),
            _ => Err(format!("invalid device kind: {s}")),
        }
    }
}

/// A peripheral the terminal can use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub connected: bool,
}

/// Source of available devices.
pub trait DeviceProvider: Send + Sync {
    /// All known devices.
    ///
    /// # Errors
    ///
    /// Returns an error if the device source cannot be read.
    fn devices(&self) -> Result<Vec<Device>, DeviceError>;

    /// Devices of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the device source cannot be read.
    fn devices_of(&self, kind: DeviceKind) -> Result<Vec<Device>, DeviceError> {
        Ok(self
            .devices()?
            .into_iter()
            .filter(|d| d.kind == kind)
            .collect())
    }
}

/// Which provider to construct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSource {
    #[default]
    Mock,
    /// JSON registry file listing the terminal's devices.
    Live(PathBuf),
}

impl DeviceSource {
    /// Build the provider for this source.
    #[must_use]
    pub fn provider(&self) -> Box<dyn DeviceProvider> {
        match self {
            Self::Mock => Box::new(MockDevices),
            Self::Live(path) => Box::new(LiveDevices::new(path.clone())),
        }
    }
}

/// Fixed demo devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDevices;

impl DeviceProvider for MockDevices {
    fn devices(&self) -> Result<Vec<Device>, DeviceError> {
        let device = |id: &str, name: &str, kind, address: &str, connected| Device {
            id: DeviceId::new(id),
            name: name.to_string(),
            kind,
            address: Some(address.to_string()),
            connected,
        };

        Ok(vec![
            device("printer-1", "Counter Receipt Printer", DeviceKind::Printer, "usb:0", true),
            device("printer-2", "Kitchen Printer", DeviceKind::Printer, "192.168.1.40:9100", false),
            device("scanner-1", "Handheld Scanner", DeviceKind::Scanner, "bt:00:11:22:33:44:55", true),
            device("cloud-1", "Cloud Backup", DeviceKind::CloudSync, "https://sync.invalid", false),
        ])
    }
}

/// Devices read from a registry file on every call.
#[derive(Debug, Clone)]
pub struct LiveDevices {
    registry: PathBuf,
}

impl LiveDevices {
    #[must_use]
    pub const fn new(registry: PathBuf) -> Self {
        Self { registry }
    }
}

impl DeviceProvider for LiveDevices {
    fn devices(&self) -> Result<Vec<Device>, DeviceError> {
        let raw = std::fs::read_to_string(&self.registry).map_err(|source| DeviceError::Io {
            path: self.registry.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DeviceError::Parse {
            path: self.registry.clone(),
            source,
        })
    }
}
