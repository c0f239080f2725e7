//! Device listing.

use tracing::info;

use pineapple_pos_engine::device::DeviceKind;
use pineapple_pos_engine::{EngineConfig, EngineError};

use super::CommandError;

/// Log devices from the configured provider, optionally of one kind.
pub fn list(config: &EngineConfig, kind: Option<DeviceKind>) -> Result<(), CommandError> {
    let provider = config.devices.provider();
    let devices = match kind {
        Some(kind) => provider.devices_of(kind),
        None => provider.devices(),
    }
    .map_err(EngineError::from)?;

    info!(count = devices.len(), "Devices");
    for device in devices {
        let status = if device.connected { "connected" } else { "offline" };
        info!(
            "{:<12} {:<10} {:<28} {:<10} {}",
            device.id.as_str(),
            device.kind.to_string(),
            device.name,
            status,
            device.address.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
