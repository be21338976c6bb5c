// ── Logging action view-model ──
//
// Programs every device of an item for logging, one at a time through the
// shared action queue, and tracks per-device progress.

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::action::{Action, ActionQueue};
use crate::error::CoreError;
use crate::model::{Item, KnownDevice, MacAddress, ModulesConfiguration};

use super::AboutDeviceVm;

/// Progress of the action on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionState {
    NotStarted,
    Working,
    Completed,
    Error(String),
}

impl ActionState {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Drives the "start logging" action for every device behind an item.
pub struct ActionLogVm {
    title: String,
    item: Item,
    devices: Vec<KnownDevice>,
    vms: Vec<AboutDeviceVm>,
    states: IndexMap<MacAddress, ActionState>,
    focus: Option<MacAddress>,
    config: ModulesConfiguration,
    actions: ActionQueue,
}

impl ActionLogVm {
    pub(crate) fn new(
        title: String,
        item: Item,
        devices: Vec<KnownDevice>,
        vms: Vec<AboutDeviceVm>,
        actions: ActionQueue,
    ) -> Self {
        let states = devices
            .iter()
            .map(|d| (d.meta.mac.clone(), ActionState::NotStarted))
            .collect();
        Self {
            title,
            item,
            devices,
            vms,
            states,
            focus: None,
            config: ModulesConfiguration::default(),
            actions,
        }
    }

    /// Use `config` as the sensors to program.
    pub fn with_configuration(mut self, config: ModulesConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn devices(&self) -> &[KnownDevice] {
        &self.devices
    }

    pub fn device_vms(&self) -> &[AboutDeviceVm] {
        &self.vms
    }

    pub fn representative_config(&self) -> &ModulesConfiguration {
        &self.config
    }

    pub fn state(&self, mac: &MacAddress) -> Option<&ActionState> {
        self.states.get(mac)
    }

    /// Per-device states in device order.
    pub fn states(&self) -> impl Iterator<Item = (&MacAddress, &ActionState)> {
        self.states.iter()
    }

    /// Device currently being worked on.
    pub fn action_focus(&self) -> Option<&MacAddress> {
        self.focus.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        !self.states.is_empty() && self.states.values().all(|s| *s == ActionState::Completed)
    }

    /// Program each device in order. Devices already completed are skipped;
    /// failures are recorded per device and don't stop the batch. Returns
    /// the number of devices that failed.
    pub async fn start(&mut self) -> usize {
        let pending: Vec<MacAddress> = self
            .states
            .iter()
            .filter(|(_, s)| **s != ActionState::Completed)
            .map(|(mac, _)| mac.clone())
            .collect();

        let mut failed = 0;
        for mac in pending {
            self.focus = Some(mac.clone());
            self.states.insert(mac.clone(), ActionState::Working);

            let result = self
                .actions
                .execute(Action::StartLogging {
                    mac: mac.clone(),
                    config: self.config.clone(),
                })
                .await;

            let state = match result {
                Ok(_) => ActionState::Completed,
                Err(e) => {
                    warn!(%mac, error = %e, "logging setup failed");
                    failed += 1;
                    ActionState::Error(e.to_string())
                }
            };
            self.states.insert(mac, state);
        }
        self.focus = None;
        info!(item = %self.item, failed, "logging action finished");
        failed
    }

    /// Factory-reset a device whose action failed, so it can be retried.
    pub async fn reset(&mut self, mac: &MacAddress) -> Result<(), CoreError> {
        if !self.state(mac).is_some_and(ActionState::is_error) {
            return Err(CoreError::ValidationFailed {
                message: format!("{mac} has not failed; reset is only offered after an error"),
            });
        }

        self.focus = Some(mac.clone());
        self.states.insert(mac.clone(), ActionState::Working);
        let result = match self.vms.iter().find(|vm| vm.mac() == mac) {
            Some(vm) => vm.reset().await,
            None => Err(CoreError::device_not_found(mac)),
        };
        self.focus = None;

        match result {
            Ok(()) => {
                self.states.insert(mac.clone(), ActionState::NotStarted);
                Ok(())
            }
            Err(e) => {
                self.states
                    .insert(mac.clone(), ActionState::Error(e.to_string()));
                Err(e)
            }
        }
    }
}
