//! The JSON registry snapshot the CLI reads and writes back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use mwkit_core::{DeviceStore, RegistrySnapshot};

use crate::error::{CliError, registry_error};

/// A `DeviceStore` seeded from a snapshot file.
pub struct RegistryFile {
    path: PathBuf,
    store: Arc<DeviceStore>,
    loaded_version: u64,
}

impl RegistryFile {
    /// Load `path`. A missing file is an empty registry.
    pub fn open(path: PathBuf) -> Result<Self, CliError> {
        let store = if path.exists() {
            let snap = RegistrySnapshot::load(&path).map_err(|e| registry_error(&path, e))?;
            debug!(
                path = %path.display(),
                devices = snap.devices.len(),
                groups = snap.groups.len(),
                sessions = snap.sessions.len(),
                "loaded registry"
            );
            DeviceStore::from_snapshot(snap)
        } else {
            debug!(path = %path.display(), "no registry file, starting empty");
            DeviceStore::new()
        };
        let loaded_version = store.version();
        Ok(Self {
            path,
            store: Arc::new(store),
            loaded_version,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.store
    }

    /// Write the store back if anything changed since it was loaded.
    pub fn save_if_changed(&self) -> Result<bool, CliError> {
        if self.store.version() == self.loaded_version {
            return Ok(false);
        }
        self.store
            .snapshot()
            .save(&self.path)
            .map_err(|e| registry_error(&self.path, e))?;
        info!(path = %self.path.display(), "saved registry");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mwkit_core::{DeviceMetadata, KnownDevice, MacAddress, Model, Registry};

    fn device(mac: &str) -> KnownDevice {
        KnownDevice {
            local_id: None,
            meta: DeviceMetadata {
                mac: MacAddress::new(mac),
                serial: "0001".into(),
                model: Model::MetaMotionS,
                name: "Wrist".into(),
            },
            connection: mwkit_core::ConnectionState::Disconnected,
            rssi: None,
        }
    }

    #[test]
    fn missing_file_is_empty_and_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        let file = RegistryFile::open(path.clone()).unwrap();
        assert_eq!(file.store().device_count(), 0);
        assert!(!file.save_if_changed().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn mutations_are_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        RegistrySnapshot {
            devices: vec![device("AA:BB")],
            ..RegistrySnapshot::default()
        }
        .save(&path)
        .unwrap();

        let file = RegistryFile::open(path.clone()).unwrap();
        file.store()
            .rename_device(&MacAddress::new("AA:BB"), "Ankle")
            .unwrap();
        assert!(file.save_if_changed().unwrap());

        let reloaded = RegistrySnapshot::load(&path).unwrap();
        assert_eq!(reloaded.devices[0].meta.name, "Ankle");
    }

    #[test]
    fn malformed_file_is_a_registry_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            RegistryFile::open(path),
            Err(CliError::Registry { .. })
        ));
    }
}
