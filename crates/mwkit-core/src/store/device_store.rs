// ── In-memory device registry ──
//
// Thread-safe, lock-free storage for devices, groups and sessions.
// Every mutation bumps a version counter published on a `watch` channel.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{
    ConnectionState, DeviceGroup, GroupId, KnownDevice, MacAddress, ModulesConfiguration,
    Session, SessionExport, SessionId, validate_name,
};
use crate::registry::Registry;

/// In-memory [`Registry`].
///
/// Stands in for the Bluetooth device framework: transport-level effects
/// (connecting, programming, resetting) are recorded on the device records
/// instead of being sent over the air.
pub struct DeviceStore {
    pub(crate) devices: EntityCollection<MacAddress, KnownDevice>,
    pub(crate) groups: EntityCollection<GroupId, DeviceGroup>,
    pub(crate) sessions: EntityCollection<SessionId, Session>,
    pub(crate) session_data: EntityCollection<SessionId, Vec<u8>>,
    pub(crate) logging: EntityCollection<MacAddress, ModulesConfiguration>,
    version: watch::Sender<u64>,
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);

        Self {
            devices: EntityCollection::new(),
            groups: EntityCollection::new(),
            sessions: EntityCollection::new(),
            session_data: EntityCollection::new(),
            logging: EntityCollection::new(),
            version,
        }
    }

    // ── Seeding / transport updates ──────────────────────────────────

    /// Insert or replace a device record. Returns `true` if it was new.
    pub fn upsert_device(&self, device: KnownDevice) -> bool {
        let is_new = self.devices.upsert(device.meta.mac.clone(), device);
        self.bump_version();
        is_new
    }

    /// Insert or replace a group. Returns `true` if it was new.
    pub fn upsert_group(&self, group: DeviceGroup) -> bool {
        let is_new = self.groups.upsert(group.id, group);
        self.bump_version();
        is_new
    }

    /// Insert a session with its recorded payload, if any.
    pub fn insert_session(&self, session: Session, data: Option<Vec<u8>>) {
        let id = session.id;
        self.sessions.upsert(id, session);
        match data {
            Some(bytes) => {
                self.session_data.upsert(id, bytes);
            }
            None => {
                self.session_data.remove(&id);
            }
        }
        self.bump_version();
    }

    /// Record a connection state change reported by the transport.
    pub fn set_connection(&self, mac: &MacAddress, state: ConnectionState) -> bool {
        let found = self.devices.update(mac, |d| d.connection = state);
        if found {
            self.bump_version();
        }
        found
    }

    /// Record a fresh RSSI reading reported by the transport.
    pub fn set_rssi(&self, mac: &MacAddress, rssi: Option<i32>) -> bool {
        let found = self.devices.update(mac, |d| d.rssi = rssi);
        if found {
            self.bump_version();
        }
        found
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Logging configuration last programmed onto a device.
    pub fn logging_config(&self, mac: &MacAddress) -> Option<ModulesConfiguration> {
        self.logging.get(mac).map(|c| (*c).clone())
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Live change subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.version.receiver_count()
    }

    // ── Private helpers ──────────────────────────────────────────────

    pub(crate) fn bump_version(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.version.send_modify(|v| *v += 1);
    }

    fn require_device(&self, mac: &MacAddress) -> Result<Arc<KnownDevice>, CoreError> {
        self.devices
            .get(mac)
            .ok_or_else(|| CoreError::device_not_found(mac))
    }

    fn require_local_device(&self, mac: &MacAddress) -> Result<Arc<KnownDevice>, CoreError> {
        let device = self.require_device(mac)?;
        if !device.is_locally_known() {
            return Err(CoreError::OperationFailed {
                message: format!("{mac} has not been seen by this host"),
            });
        }
        Ok(device)
    }
}

impl Registry for DeviceStore {
    // ── Lookups ──────────────────────────────────────────────────────

    fn device_and_metadata(&self, mac: &MacAddress) -> Option<KnownDevice> {
        self.devices.get(mac).map(|d| (*d).clone())
    }

    fn group(&self, id: &GroupId) -> Option<DeviceGroup> {
        self.groups.get(id).map(|g| (*g).clone())
    }

    fn devices_in_group(&self, group: &DeviceGroup) -> Vec<KnownDevice> {
        group
            .members
            .iter()
            .filter_map(|mac| self.device_and_metadata(mac))
            .collect()
    }

    fn devices(&self) -> Vec<KnownDevice> {
        let mut devices: Vec<KnownDevice> =
            self.devices.values().iter().map(|d| (**d).clone()).collect();
        devices.sort_by(|a, b| a.meta.name.cmp(&b.meta.name).then_with(|| a.mac().cmp(b.mac())));
        devices
    }

    fn groups(&self) -> Vec<DeviceGroup> {
        let mut groups: Vec<DeviceGroup> =
            self.groups.values().iter().map(|g| (**g).clone()).collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        groups
    }

    fn sessions(&self) -> Vec<Session> {
        self.sessions.values().iter().map(|s| (**s).clone()).collect()
    }

    // ── Mutations ────────────────────────────────────────────────────

    fn rename_device(&self, mac: &MacAddress, name: &str) -> Result<(), CoreError> {
        let name = validate_name(name)?;
        if !self.devices.update(mac, |d| d.meta.name.clone_from(&name)) {
            return Err(CoreError::device_not_found(mac));
        }
        debug!(%mac, %name, "renamed device");
        self.bump_version();
        Ok(())
    }

    fn rename_group(&self, id: &GroupId, name: &str) -> Result<(), CoreError> {
        let name = validate_name(name)?;
        if !self.groups.update(id, |g| g.name.clone_from(&name)) {
            return Err(CoreError::group_not_found(id));
        }
        debug!(%id, %name, "renamed group");
        self.bump_version();
        Ok(())
    }

    fn create_group(&self, name: &str, members: &[MacAddress]) -> Result<GroupId, CoreError> {
        let name = validate_name(name)?;
        let mut ordered: Vec<MacAddress> = Vec::with_capacity(members.len());
        for mac in members {
            self.require_device(mac)?;
            if !ordered.contains(mac) {
                ordered.push(mac.clone());
            }
        }
        if ordered.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "a group needs at least one device".into(),
            });
        }

        let id = GroupId::new_v4();
        info!(%id, %name, members = ordered.len(), "created group");
        self.groups.upsert(
            id,
            DeviceGroup {
                id,
                name,
                members: ordered,
            },
        );
        self.bump_version();
        Ok(id)
    }

    fn disband_group(&self, id: &GroupId) -> Result<(), CoreError> {
        self.groups
            .remove(id)
            .ok_or_else(|| CoreError::group_not_found(id))?;
        info!(%id, "disbanded group");
        self.bump_version();
        Ok(())
    }

    fn forget_locally(&self, mac: &MacAddress) -> Result<(), CoreError> {
        let found = self.devices.update(mac, |d| {
            d.local_id = None;
            d.connection = ConnectionState::Disconnected;
            d.rssi = None;
        });
        if !found {
            return Err(CoreError::device_not_found(mac));
        }
        self.logging.remove(mac);
        info!(%mac, "forgot device on this host");
        self.bump_version();
        Ok(())
    }

    fn forget_globally(&self, mac: &MacAddress) -> Result<(), CoreError> {
        self.devices
            .remove(mac)
            .ok_or_else(|| CoreError::device_not_found(mac))?;
        self.logging.remove(mac);
        for id in self.groups.keys() {
            self.groups.update(&id, |g| g.members.retain(|m| m != mac));
        }
        info!(%mac, "forgot device everywhere");
        self.bump_version();
        Ok(())
    }

    fn connect(&self, mac: &MacAddress) -> Result<(), CoreError> {
        self.require_local_device(mac)?;
        self.devices
            .update(mac, |d| d.connection = ConnectionState::Connected);
        debug!(%mac, "connected");
        self.bump_version();
        Ok(())
    }

    fn rename_session(&self, id: &SessionId, name: &str) -> Result<(), CoreError> {
        let name = validate_name(name)?;
        if !self.sessions.update(id, |s| s.name.clone_from(&name)) {
            return Err(CoreError::session_not_found(id));
        }
        self.bump_version();
        Ok(())
    }

    fn delete_session(&self, id: &SessionId) -> Result<(), CoreError> {
        self.sessions
            .remove(id)
            .ok_or_else(|| CoreError::session_not_found(id))?;
        self.session_data.remove(id);
        info!(%id, "deleted session");
        self.bump_version();
        Ok(())
    }

    // ── Long-running operations ──────────────────────────────────────

    fn export_session(&self, id: &SessionId) -> Result<SessionExport, CoreError> {
        let session = self
            .sessions
            .get(id)
            .ok_or_else(|| CoreError::session_not_found(id))?;
        let data = self
            .session_data
            .get(id)
            .ok_or_else(|| CoreError::OperationFailed {
                message: format!("session '{}' has no recorded data", session.name),
            })?;
        Ok(SessionExport::for_session(&session, (*data).clone()))
    }

    fn factory_reset(&self, mac: &MacAddress) -> Result<(), CoreError> {
        self.require_local_device(mac)?;
        self.logging.remove(mac);
        self.devices
            .update(mac, |d| d.connection = ConnectionState::Disconnected);
        info!(%mac, "factory reset");
        self.bump_version();
        Ok(())
    }

    fn start_logging(
        &self,
        mac: &MacAddress,
        config: &ModulesConfiguration,
    ) -> Result<(), CoreError> {
        if config.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "no sensors enabled".into(),
            });
        }
        self.require_local_device(mac)?;
        self.logging.upsert(mac.clone(), config.clone());
        self.devices
            .update(mac, |d| d.connection = ConnectionState::Connected);
        info!(%mac, modules = config.iter().count(), "started logging");
        self.bump_version();
        Ok(())
    }

    // ── Change notification ──────────────────────────────────────────

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceMetadata, Model, PeripheralId, SensorModule};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn device(mac: &str, name: &str) -> KnownDevice {
        KnownDevice {
            local_id: Some(PeripheralId::new_v4()),
            meta: DeviceMetadata {
                mac: MacAddress::new(mac),
                serial: format!("SN-{name}"),
                model: Model::MetaMotionS,
                name: name.into(),
            },
            connection: ConnectionState::Disconnected,
            rssi: Some(-60),
        }
    }

    fn seeded() -> DeviceStore {
        let store = DeviceStore::new();
        store.upsert_device(device("AA:BB", "Sensor1"));
        store.upsert_device(device("CC:DD", "Sensor2"));
        store
    }

    #[test]
    fn mutations_bump_version() {
        let store = seeded();
        let before = store.version();
        store.rename_device(&MacAddress::new("AA:BB"), "Left wrist").unwrap();
        assert!(store.version() > before);
    }

    #[test]
    fn rename_rejects_blank_names() {
        let store = seeded();
        let err = store.rename_device(&MacAddress::new("AA:BB"), "   ").unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn rename_unknown_device_fails() {
        let store = seeded();
        let err = store.rename_device(&MacAddress::new("ZZ:ZZ"), "x").unwrap_err();
        assert!(matches!(err, CoreError::DeviceNotFound { .. }));
    }

    #[test]
    fn create_group_dedupes_and_keeps_order() {
        let store = seeded();
        let macs = [
            MacAddress::new("CC:DD"),
            MacAddress::new("AA:BB"),
            MacAddress::new("cc-dd"),
        ];
        let id = store.create_group("Lab Kit", &macs).unwrap();
        let group = store.group(&id).unwrap();
        assert_eq!(
            group.members,
            vec![MacAddress::new("CC:DD"), MacAddress::new("AA:BB")]
        );
    }

    #[test]
    fn create_group_requires_known_members() {
        let store = seeded();
        let err = store
            .create_group("Kit", &[MacAddress::new("ZZ:ZZ")])
            .unwrap_err();
        assert!(matches!(err, CoreError::DeviceNotFound { .. }));
        assert!(matches!(
            store.create_group("Kit", &[]).unwrap_err(),
            CoreError::ValidationFailed { .. }
        ));
    }

    #[test]
    fn disband_keeps_member_devices() {
        let store = seeded();
        let id = store
            .create_group("Kit", &[MacAddress::new("AA:BB")])
            .unwrap();
        store.disband_group(&id).unwrap();
        assert!(store.group(&id).is_none());
        assert!(store.device_and_metadata(&MacAddress::new("AA:BB")).is_some());
    }

    #[test]
    fn forget_locally_keeps_synced_record() {
        let store = seeded();
        let mac = MacAddress::new("AA:BB");
        store.forget_locally(&mac).unwrap();
        let d = store.device_and_metadata(&mac).unwrap();
        assert!(!d.is_locally_known());
        assert_eq!(d.rssi, None);
    }

    #[test]
    fn forget_globally_drops_group_membership() {
        let store = seeded();
        let id = store
            .create_group("Kit", &[MacAddress::new("AA:BB"), MacAddress::new("CC:DD")])
            .unwrap();
        store.forget_globally(&MacAddress::new("AA:BB")).unwrap();
        assert!(store.device_and_metadata(&MacAddress::new("AA:BB")).is_none());
        assert_eq!(store.group(&id).unwrap().members, vec![MacAddress::new("CC:DD")]);
    }

    #[test]
    fn devices_in_group_skips_unknown_members() {
        let store = seeded();
        let group = DeviceGroup {
            id: GroupId::new_v4(),
            name: "Kit".into(),
            members: vec![MacAddress::new("CC:DD"), MacAddress::new("EE:FF")],
        };
        let members = store.devices_in_group(&group);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name(), "Sensor2");
    }

    #[test]
    fn connect_requires_local_device() {
        let store = seeded();
        let mac = MacAddress::new("AA:BB");
        store.forget_locally(&mac).unwrap();
        assert!(matches!(
            store.connect(&mac).unwrap_err(),
            CoreError::OperationFailed { .. }
        ));
    }

    #[test]
    fn start_logging_records_configuration_and_reset_clears_it() {
        let store = seeded();
        let mac = MacAddress::new("AA:BB");
        let mut cfg = ModulesConfiguration::default();
        cfg.enable(SensorModule::Accelerometer);

        store.start_logging(&mac, &cfg).unwrap();
        assert_eq!(store.logging_config(&mac), Some(cfg));

        store.factory_reset(&mac).unwrap();
        assert!(store.logging_config(&mac).is_none());
    }

    #[test]
    fn start_logging_rejects_empty_configuration() {
        let store = seeded();
        let err = store
            .start_logging(&MacAddress::new("AA:BB"), &ModulesConfiguration::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn export_session_requires_data() {
        let store = seeded();
        let session = Session {
            id: SessionId::new_v4(),
            name: "Walk".into(),
            date: Utc::now(),
            devices: vec![MacAddress::new("AA:BB")],
        };
        store.insert_session(session.clone(), None);
        assert!(matches!(
            store.export_session(&session.id).unwrap_err(),
            CoreError::OperationFailed { .. }
        ));

        store.insert_session(session.clone(), Some(b"t,x\n0,1\n".to_vec()));
        let export = store.export_session(&session.id).unwrap();
        assert_eq!(export.filename, "Walk.csv");
        assert_eq!(export.bytes, b"t,x\n0,1\n".to_vec());
    }

    #[test]
    fn subscribers_see_changes() {
        let store = seeded();
        let mut rx = store.subscribe();
        rx.borrow_and_update();
        store.set_rssi(&MacAddress::new("AA:BB"), Some(-90));
        assert!(rx.has_changed().unwrap());
    }
}
