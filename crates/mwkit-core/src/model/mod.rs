// ── Domain model ──

pub mod device;
pub mod entity_id;
pub mod group;
pub mod item;
pub mod sensor;
pub mod session;

pub use device::{ConnectionState, DeviceMetadata, KnownDevice, Model, SignalLevel};
pub use entity_id::{GroupId, MacAddress, PeripheralId, SessionId};
pub use group::DeviceGroup;
pub use item::Item;
pub use sensor::{ModulesConfiguration, SensorModule};
pub use session::{Session, SessionExport};

use crate::error::CoreError;

/// Trim a user-entered display name, rejecting blank input.
pub(crate) fn validate_name(raw: &str) -> Result<String, CoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::ValidationFailed {
            message: "name must not be empty".into(),
        });
    }
    Ok(name.to_owned())
}
