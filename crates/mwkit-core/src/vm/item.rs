// ── Known item view-model ──
//
// One capability surface over a solo device or a group. The variant is
// fixed when the item resolves; every uniform field is computed from it
// through `aggregate`.

use std::sync::Arc;

use tracing::{debug, info};

use super::aggregate;
use crate::error::CoreError;
use crate::model::{
    ConnectionState, DeviceGroup, GroupId, Item, KnownDevice, MacAddress, Model, SignalLevel,
};
use crate::registry::Registry;
use crate::subscription::Subscription;

/// The registry state an [`Item`] resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    Solo(KnownDevice),
    Group {
        group: DeviceGroup,
        /// Members as of resolution, in the group's stored order.
        members: Vec<KnownDevice>,
    },
}

impl ItemSource {
    /// Look the item up in the registry. Group membership is read fresh.
    pub fn resolve(registry: &dyn Registry, item: &Item) -> Option<Self> {
        match item {
            Item::Known(mac) => registry.device_and_metadata(mac).map(Self::Solo),
            Item::Group(id) => registry.group(id).map(|group| {
                let members = registry.devices_in_group(&group);
                Self::Group { group, members }
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Solo(device) => &device.meta.name,
            Self::Group { group, .. } => &group.name,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    /// Resolved device records backing this item.
    pub fn devices(&self) -> &[KnownDevice] {
        match self {
            Self::Solo(device) => std::slice::from_ref(device),
            Self::Group { members, .. } => members,
        }
    }

    pub fn models(&self) -> Vec<(MacAddress, Model)> {
        aggregate::models(self.devices())
    }

    /// Member identities, from the same resolved members as `models`. A
    /// stored member the registry no longer knows is left out.
    pub fn macs(&self) -> Vec<MacAddress> {
        self.devices().iter().map(|d| d.meta.mac.clone()).collect()
    }

    pub fn rssi(&self) -> SignalLevel {
        aggregate::rssi(self.devices())
    }

    pub fn connection(&self) -> ConnectionState {
        aggregate::connection(self.devices())
    }

    pub fn is_locally_known(&self) -> bool {
        aggregate::is_locally_known(self.devices())
    }
}

/// View-model for a device cell in the device chooser.
///
/// Holds the last resolved [`ItemSource`] for rendering. Commands always
/// re-resolve the item first, so they act on the registry's current state
/// and fail with [`CoreError::ItemNotFound`] if it has since vanished.
pub struct KnownItemVm {
    item: Item,
    source: ItemSource,
    registry: Arc<dyn Registry>,
    subscription: Option<Subscription>,
}

impl KnownItemVm {
    pub(crate) fn new(item: Item, source: ItemSource, registry: Arc<dyn Registry>) -> Self {
        Self {
            item,
            source,
            registry,
            subscription: None,
        }
    }

    // ── Uniform read surface ─────────────────────────────────────────

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn source(&self) -> &ItemSource {
        &self.source
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn is_group(&self) -> bool {
        self.source.is_group()
    }

    pub fn models(&self) -> Vec<(MacAddress, Model)> {
        self.source.models()
    }

    pub fn macs(&self) -> Vec<MacAddress> {
        self.source.macs()
    }

    pub fn rssi(&self) -> SignalLevel {
        self.source.rssi()
    }

    pub fn is_locally_known(&self) -> bool {
        self.source.is_locally_known()
    }

    pub fn connection(&self) -> ConnectionState {
        self.source.connection()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start observing the registry. Idempotent.
    pub fn on_appear(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(Subscription::new(
                format!("item:{}", self.item),
                self.registry.subscribe(),
            ));
        }
        self.refresh();
    }

    /// Stop observing the registry.
    pub fn on_disappear(&mut self) {
        self.subscription = None;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Re-read the item from the registry. Returns `false` (keeping the
    /// last state) if the item no longer resolves.
    pub fn refresh(&mut self) -> bool {
        match ItemSource::resolve(self.registry.as_ref(), &self.item) {
            Some(source) => {
                self.source = source;
                true
            }
            None => {
                debug!(item = %self.item, "item vanished from registry");
                false
            }
        }
    }

    /// Wait for the next registry change and refresh. Returns `None` when
    /// not subscribed or when the registry has gone away.
    pub async fn changed(&mut self) -> Option<bool> {
        self.subscription.as_mut()?.changed().await?;
        Some(self.refresh())
    }

    // ── Commands ─────────────────────────────────────────────────────

    fn current(&self) -> Result<ItemSource, CoreError> {
        ItemSource::resolve(self.registry.as_ref(), &self.item).ok_or_else(|| {
            CoreError::ItemNotFound {
                item: self.item.to_string(),
            }
        })
    }

    pub fn rename(&self, name: &str) -> Result<(), CoreError> {
        match self.current()? {
            ItemSource::Solo(device) => self.registry.rename_device(&device.meta.mac, name),
            ItemSource::Group { group, .. } => self.registry.rename_group(&group.id, name),
        }
    }

    /// Create a new group from this item plus `others`, flattening any
    /// groups into their currently resolved members.
    pub fn group_with(&self, others: &[Item], name: &str) -> Result<GroupId, CoreError> {
        let mut macs = self.current()?.macs();
        for other in others {
            let source = ItemSource::resolve(self.registry.as_ref(), other).ok_or_else(|| {
                CoreError::ItemNotFound {
                    item: other.to_string(),
                }
            })?;
            macs.extend(source.macs());
        }
        self.registry.create_group(name, &macs)
    }

    pub fn disband_group(&self) -> Result<(), CoreError> {
        match self.current()? {
            ItemSource::Group { group, .. } => self.registry.disband_group(&group.id),
            ItemSource::Solo(_) => Err(CoreError::ValidationFailed {
                message: format!("{} is not a group", self.item),
            }),
        }
    }

    /// Forget every resolved device on this host only.
    pub fn forget_locally(&self) -> Result<(), CoreError> {
        for device in self.current()?.devices() {
            self.registry.forget_locally(&device.meta.mac)?;
        }
        Ok(())
    }

    /// Forget every resolved device everywhere. For a group, the group
    /// goes too.
    pub fn forget_globally(&self) -> Result<(), CoreError> {
        let source = self.current()?;
        for device in source.devices() {
            self.registry.forget_globally(&device.meta.mac)?;
        }
        if let ItemSource::Group { group, .. } = &source {
            self.registry.disband_group(&group.id)?;
        }
        info!(item = %self.item, "forgot item everywhere");
        Ok(())
    }

    /// Connect every locally known member. Cloud-only members are skipped.
    pub fn connect(&self) -> Result<(), CoreError> {
        for device in self.current()?.devices() {
            if device.is_locally_known() {
                self.registry.connect(&device.meta.mac)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for KnownItemVm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnownItemVm")
            .field("item", &self.item)
            .field("source", &self.source)
            .field("subscribed", &self.is_subscribed())
            .finish_non_exhaustive()
    }
}
