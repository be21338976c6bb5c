// ── Registry snapshots ──
//
// Serializable image of a `DeviceStore`, used to seed the store from a
// JSON file and write mutations back. Applying a snapshot upserts every
// incoming entity first and then prunes stale keys, so readers never
// observe an empty registry mid-apply.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DeviceStore;
use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{DeviceGroup, KnownDevice, Session, SessionId};

/// Everything a `DeviceStore` holds, in a stable, serializable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub devices: Vec<KnownDevice>,
    #[serde(default)]
    pub groups: Vec<DeviceGroup>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Recorded session payloads (CSV text), keyed by session id.
    #[serde(default)]
    pub session_data: BTreeMap<SessionId, String>,
}

impl RegistrySnapshot {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

/// Upsert all incoming entities, then prune any existing keys not in the
/// incoming set.
fn upsert_and_prune<K, T>(collection: &EntityCollection<K, T>, items: Vec<(K, T)>)
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    let incoming_keys: HashSet<K> = items.iter().map(|(k, _)| k.clone()).collect();
    for (key, entity) in items {
        collection.upsert(key, entity);
    }
    for existing_key in collection.keys() {
        if !incoming_keys.contains(&existing_key) {
            collection.remove(&existing_key);
        }
    }
}

impl DeviceStore {
    /// Build a store holding exactly the snapshot's contents.
    pub fn from_snapshot(snap: RegistrySnapshot) -> Self {
        let store = Self::new();
        store.apply_snapshot(snap);
        store
    }

    /// Replace the store's contents with `snap`. Bumps the version once.
    pub fn apply_snapshot(&self, snap: RegistrySnapshot) {
        debug!(
            devices = snap.devices.len(),
            groups = snap.groups.len(),
            sessions = snap.sessions.len(),
            "applying registry snapshot"
        );

        upsert_and_prune(
            &self.devices,
            snap.devices
                .into_iter()
                .map(|d| (d.meta.mac.clone(), d))
                .collect(),
        );
        upsert_and_prune(
            &self.groups,
            snap.groups.into_iter().map(|g| (g.id, g)).collect(),
        );
        upsert_and_prune(
            &self.sessions,
            snap.sessions.into_iter().map(|s| (s.id, s)).collect(),
        );
        upsert_and_prune(
            &self.session_data,
            snap.session_data
                .into_iter()
                .map(|(id, text)| (id, text.into_bytes()))
                .collect(),
        );

        // Logging programs belong to devices; drop any for removed devices.
        for mac in self.logging.keys() {
            if !self.devices.contains(&mac) {
                self.logging.remove(&mac);
            }
        }

        self.bump_version();
    }

    /// Capture the store's contents. Devices sort by MAC, groups and
    /// sessions by id, so saving twice yields identical files.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut devices: Vec<KnownDevice> =
            self.devices.values().iter().map(|d| (**d).clone()).collect();
        devices.sort_by(|a, b| a.mac().cmp(b.mac()));

        let mut groups: Vec<DeviceGroup> =
            self.groups.values().iter().map(|g| (**g).clone()).collect();
        groups.sort_by_key(|g| g.id);

        let mut sessions: Vec<Session> =
            self.sessions.values().iter().map(|s| (**s).clone()).collect();
        sessions.sort_by_key(|s| s.id);

        let session_data = self
            .session_data
            .keys()
            .into_iter()
            .filter_map(|id| {
                self.session_data
                    .get(&id)
                    .map(|bytes| (id, String::from_utf8_lossy(&bytes).into_owned()))
            })
            .collect();

        RegistrySnapshot {
            devices,
            groups,
            sessions,
            session_data,
        }
    }
}
