// ── Per-device view-model ──

use std::sync::Arc;

use crate::action::{Action, ActionQueue};
use crate::error::CoreError;
use crate::model::{ConnectionState, DeviceMetadata, KnownDevice, MacAddress, SignalLevel};
use crate::registry::Registry;
use crate::subscription::Subscription;

/// One device's row on the history and action screens.
pub struct AboutDeviceVm {
    device: KnownDevice,
    index: usize,
    registry: Arc<dyn Registry>,
    actions: ActionQueue,
    subscription: Option<Subscription>,
}

impl AboutDeviceVm {
    pub(crate) fn new(
        device: KnownDevice,
        registry: Arc<dyn Registry>,
        actions: ActionQueue,
    ) -> Self {
        Self {
            device,
            index: 0,
            registry,
            actions,
            subscription: None,
        }
    }

    /// Set this row's position within its batch. Display ordering only;
    /// identity is always the MAC.
    pub fn configure(&mut self, index: usize) {
        self.index = index;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn meta(&self) -> &DeviceMetadata {
        &self.device.meta
    }

    pub fn mac(&self) -> &MacAddress {
        &self.device.meta.mac
    }

    pub fn device(&self) -> &KnownDevice {
        &self.device
    }

    pub fn connection(&self) -> ConnectionState {
        self.device.connection
    }

    pub fn rssi(&self) -> SignalLevel {
        self.device.signal()
    }

    pub fn is_locally_known(&self) -> bool {
        self.device.is_locally_known()
    }

    pub fn on_appear(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(Subscription::new(
                format!("device:{}", self.device.meta.mac),
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

    /// Re-read the device. Returns `false` if it has been forgotten.
    pub fn refresh(&mut self) -> bool {
        match self.registry.device_and_metadata(&self.device.meta.mac) {
            Some(device) => {
                self.device = device;
                true
            }
            None => false,
        }
    }

    /// Factory-reset the device on the action queue.
    pub async fn reset(&self) -> Result<(), CoreError> {
        self.actions
            .execute(Action::FactoryReset {
                mac: self.device.meta.mac.clone(),
            })
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for AboutDeviceVm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AboutDeviceVm")
            .field("mac", &self.device.meta.mac)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
