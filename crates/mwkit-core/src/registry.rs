// ── Device registry seam ──
//
// The registry is the sole owner and mutator of device, group and session
// state. Everything in this crate reads through it; nothing caches across
// a screen's lifetime. `DeviceStore` is the in-memory implementation; a
// host app wraps its Bluetooth framework in another.

use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::{
    DeviceGroup, GroupId, KnownDevice, MacAddress, ModulesConfiguration, Session, SessionExport,
    SessionId,
};

/// Source of truth for known devices, groups and recorded sessions.
///
/// Lookups return owned snapshots. Mutations bump the version published on
/// [`subscribe`](Registry::subscribe). The long-running operations
/// (`export_session`, `factory_reset`, `start_logging`) may block; callers
/// route them through the [`ActionQueue`](crate::ActionQueue).
pub trait Registry: Send + Sync {
    // ── Lookups ──────────────────────────────────────────────────────

    fn device_and_metadata(&self, mac: &MacAddress) -> Option<KnownDevice>;

    fn group(&self, id: &GroupId) -> Option<DeviceGroup>;

    /// Current members of `group`, in the group's stored order. Members
    /// the registry no longer knows are skipped.
    fn devices_in_group(&self, group: &DeviceGroup) -> Vec<KnownDevice>;

    /// All known devices, sorted by name then MAC.
    fn devices(&self) -> Vec<KnownDevice>;

    /// All groups, sorted by name.
    fn groups(&self) -> Vec<DeviceGroup>;

    fn sessions(&self) -> Vec<Session>;

    // ── Mutations ────────────────────────────────────────────────────

    fn rename_device(&self, mac: &MacAddress, name: &str) -> Result<(), CoreError>;

    fn rename_group(&self, id: &GroupId, name: &str) -> Result<(), CoreError>;

    fn create_group(&self, name: &str, members: &[MacAddress]) -> Result<GroupId, CoreError>;

    /// Remove the group. Member devices are untouched.
    fn disband_group(&self, id: &GroupId) -> Result<(), CoreError>;

    /// Drop this host's association with the device but keep the synced
    /// record.
    fn forget_locally(&self, mac: &MacAddress) -> Result<(), CoreError>;

    /// Remove the device record everywhere, including group memberships.
    fn forget_globally(&self, mac: &MacAddress) -> Result<(), CoreError>;

    fn connect(&self, mac: &MacAddress) -> Result<(), CoreError>;

    fn rename_session(&self, id: &SessionId, name: &str) -> Result<(), CoreError>;

    fn delete_session(&self, id: &SessionId) -> Result<(), CoreError>;

    // ── Long-running operations ──────────────────────────────────────

    fn export_session(&self, id: &SessionId) -> Result<SessionExport, CoreError>;

    fn factory_reset(&self, mac: &MacAddress) -> Result<(), CoreError>;

    fn start_logging(
        &self,
        mac: &MacAddress,
        config: &ModulesConfiguration,
    ) -> Result<(), CoreError>;

    // ── Change notification ──────────────────────────────────────────

    /// Receiver of the registry's version counter.
    fn subscribe(&self) -> watch::Receiver<u64>;
}
