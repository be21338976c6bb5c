// ── Not-yet-known device view-model ──
//
// A chooser cell for a peripheral this host has seen but not remembered.
// The only identity is the host-local peripheral id; once the registry
// holds a device with that id the cell can route as a known item.

use std::sync::Arc;

use crate::model::{Item, KnownDevice, PeripheralId};
use crate::registry::Registry;
use crate::subscription::Subscription;

/// Placeholder name until the peripheral is remembered.
pub const UNKNOWN_DEVICE_NAME: &str = "MetaWear";

pub struct UnknownDeviceVm {
    id: PeripheralId,
    remembered: Option<KnownDevice>,
    registry: Arc<dyn Registry>,
    subscription: Option<Subscription>,
}

impl UnknownDeviceVm {
    pub(crate) fn new(id: PeripheralId, registry: Arc<dyn Registry>) -> Self {
        let mut vm = Self {
            id,
            remembered: None,
            registry,
            subscription: None,
        };
        vm.refresh();
        vm
    }

    pub fn id(&self) -> PeripheralId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.remembered
            .as_ref()
            .map_or(UNKNOWN_DEVICE_NAME, KnownDevice::name)
    }

    /// Registry record carrying this peripheral id, if one exists.
    pub fn remembered(&self) -> Option<&KnownDevice> {
        self.remembered.as_ref()
    }

    /// Routing key to hand to [`make_item_vm`](crate::UiFactory::make_item_vm)
    /// once the peripheral has been remembered.
    pub fn item(&self) -> Option<Item> {
        self.remembered
            .as_ref()
            .map(|device| Item::Known(device.meta.mac.clone()))
    }

    pub fn on_appear(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(Subscription::new(
                format!("peripheral:{}", self.id),
                self.registry.subscribe(),
            ));
        }
        self.refresh();
    }

    pub fn on_disappear(&mut self) {
        self.subscription = None;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Look the peripheral up again. Returns `true` if it is now remembered.
    pub fn refresh(&mut self) -> bool {
        self.remembered = self
            .registry
            .devices()
            .into_iter()
            .find(|d| d.local_id == Some(self.id));
        self.remembered.is_some()
    }
}

impl std::fmt::Debug for UnknownDeviceVm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnknownDeviceVm")
            .field("id", &self.id)
            .field("remembered", &self.remembered.is_some())
            .finish_non_exhaustive()
    }
}
