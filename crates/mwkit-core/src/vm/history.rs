// ── History screen view-model ──

use std::sync::Arc;

use crate::action::ActionQueue;
use crate::factory::{known_devices, make_about_vms};
use crate::model::{Item, MacAddress};
use crate::registry::Registry;
use crate::subscription::Subscription;

use super::AboutDeviceVm;

/// Header and per-device rows for an item's history screen.
pub struct HistoryScreenVm {
    title: String,
    item: Item,
    vms: Vec<AboutDeviceVm>,
    registry: Arc<dyn Registry>,
    actions: ActionQueue,
    subscription: Option<Subscription>,
}

impl HistoryScreenVm {
    pub(crate) fn new(
        title: String,
        item: Item,
        vms: Vec<AboutDeviceVm>,
        registry: Arc<dyn Registry>,
        actions: ActionQueue,
    ) -> Self {
        Self {
            title,
            item,
            vms,
            registry,
            actions,
            subscription: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn vms(&self) -> &[AboutDeviceVm] {
        &self.vms
    }

    pub fn macs(&self) -> Vec<MacAddress> {
        self.vms.iter().map(|vm| vm.mac().clone()).collect()
    }

    pub fn on_appear(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(Subscription::new(
                format!("history:{}", self.item),
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

    /// Rebuild title and rows from the registry. Row indices are
    /// reassigned to match the new device list.
    pub fn refresh(&mut self) {
        let (title, devices) = known_devices(self.registry.as_ref(), &self.item);
        self.title = title;
        self.vms = make_about_vms(&devices, &self.registry, &self.actions);
    }

    /// Wait for the next registry change and refresh. Returns `false`
    /// when not subscribed or when the registry has gone away.
    pub async fn changed(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        if subscription.changed().await.is_none() {
            return false;
        }
        self.refresh();
        true
    }
}
