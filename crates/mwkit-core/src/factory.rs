// ── View-model factory ──
//
// Resolves routing items against the registry and wires view-models to
// it. Two lookup policies live here:
//
// - `make_item_vm` panics on an unknown identity. Routing only produces
//   items for things it was shown.
// - `known_devices` degrades to `("Error", [])`; aggregate screens must
//   still render when an item disappears underneath them.

use std::sync::Arc;

use tracing::debug;

use crate::action::ActionQueue;
use crate::config::FactoryConfig;
use crate::model::{Item, KnownDevice, PeripheralId};
use crate::registry::Registry;
use crate::vm::{
    AboutDeviceVm, ActionLogVm, HistoricalSessionsVm, HistoryScreenVm, ItemSource, KnownItemVm,
    SensorConfigurationVm, UnknownDeviceVm,
};

/// Title used when an item can't be resolved on the lenient path.
pub const UNRESOLVED_TITLE: &str = "Error";

/// Builds view-models over an injected registry.
///
/// Owns the single [`ActionQueue`] shared by every view-model it makes, so
/// downloads and resets from any screen run one after another.
pub struct UiFactory {
    registry: Arc<dyn Registry>,
    actions: ActionQueue,
    config: FactoryConfig,
}

impl UiFactory {
    pub fn new(registry: Arc<dyn Registry>, config: FactoryConfig) -> Self {
        let actions = ActionQueue::new(Arc::clone(&registry), config.action_queue_capacity);
        Self {
            registry,
            actions,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    pub fn actions(&self) -> &ActionQueue {
        &self.actions
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    // ── Strict resolution ────────────────────────────────────────────

    /// Non-panicking lookup underneath [`make_item_vm`](Self::make_item_vm).
    pub fn resolve_item(&self, item: &Item) -> Option<ItemSource> {
        ItemSource::resolve(self.registry.as_ref(), item)
    }

    /// Build the chooser cell view-model for `item`.
    ///
    /// # Panics
    ///
    /// If `item` does not resolve. Callers must only pass items that came
    /// from the registry; a miss means routing and registry disagree.
    pub fn make_item_vm(&self, item: &Item) -> KnownItemVm {
        let Some(source) = self.resolve_item(item) else {
            panic!("navigated to {item}, which the registry does not know");
        };
        debug!(%item, group = source.is_group(), "resolved item");
        KnownItemVm::new(item.clone(), source, Arc::clone(&self.registry))
    }

    /// Chooser cell for a peripheral that has been seen but not remembered.
    /// Never panics; the peripheral id need not be in the registry.
    pub fn make_unknown_item_vm(&self, id: PeripheralId) -> UnknownDeviceVm {
        UnknownDeviceVm::new(id, Arc::clone(&self.registry))
    }

    pub fn make_about_device_vm(&self, device: KnownDevice) -> AboutDeviceVm {
        AboutDeviceVm::new(device, Arc::clone(&self.registry), self.actions.clone())
    }

    // ── Lenient resolution ───────────────────────────────────────────

    /// Title and device list for aggregate screens.
    ///
    /// Never panics: an unknown item yields `("Error", [])`.
    pub fn known_devices(&self, item: &Item) -> (String, Vec<KnownDevice>) {
        known_devices(self.registry.as_ref(), item)
    }

    pub fn make_history_screen_vm(&self, item: Item) -> HistoryScreenVm {
        let (title, devices) = self.known_devices(&item);
        let vms = self.make_about_vms(&devices);
        HistoryScreenVm::new(
            title,
            item,
            vms,
            Arc::clone(&self.registry),
            self.actions.clone(),
        )
    }

    pub fn make_sensor_configuration_vm(&self, item: Item) -> SensorConfigurationVm {
        let (title, devices) = self.known_devices(&item);
        SensorConfigurationVm::new(title, item, devices)
    }

    pub fn make_action_log_vm(&self, item: Item) -> ActionLogVm {
        let (title, devices) = self.known_devices(&item);
        let vms = self.make_about_vms(&devices);
        ActionLogVm::new(title, item, devices, vms, self.actions.clone())
    }

    pub fn make_past_sessions_vm(&self) -> HistoricalSessionsVm {
        HistoricalSessionsVm::new(Arc::clone(&self.registry), self.actions.clone())
    }

    fn make_about_vms(&self, devices: &[KnownDevice]) -> Vec<AboutDeviceVm> {
        make_about_vms(devices, &self.registry, &self.actions)
    }
}

pub(crate) fn known_devices(registry: &dyn Registry, item: &Item) -> (String, Vec<KnownDevice>) {
    match item {
        Item::Group(id) => {
            if let Some(group) = registry.group(id) {
                let devices = registry.devices_in_group(&group);
                return (group.name, devices);
            }
        }
        Item::Known(mac) => {
            if let Some(device) = registry.device_and_metadata(mac) {
                return (device.meta.name.clone(), vec![device]);
            }
        }
    }
    debug!(%item, "item did not resolve; using placeholder");
    (UNRESOLVED_TITLE.to_owned(), Vec::new())
}

/// One view-model per device, each configured with its batch position.
pub(crate) fn make_about_vms(
    devices: &[KnownDevice],
    registry: &Arc<dyn Registry>,
    actions: &ActionQueue,
) -> Vec<AboutDeviceVm> {
    devices
        .iter()
        .enumerate()
        .map(|(index, device)| {
            let mut vm = AboutDeviceVm::new(device.clone(), Arc::clone(registry), actions.clone());
            vm.configure(index);
            vm
        })
        .collect()
}
