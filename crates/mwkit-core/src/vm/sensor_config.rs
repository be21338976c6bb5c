// ── Sensor configuration view-model ──

use crate::model::{Item, KnownDevice, ModulesConfiguration, SensorModule};

/// Choose which sensors to log before starting a logging action.
#[derive(Debug, Clone)]
pub struct SensorConfigurationVm {
    title: String,
    item: Item,
    devices: Vec<KnownDevice>,
    config: ModulesConfiguration,
}

impl SensorConfigurationVm {
    pub(crate) fn new(title: String, item: Item, devices: Vec<KnownDevice>) -> Self {
        Self {
            title,
            item,
            devices,
            config: ModulesConfiguration::default(),
        }
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

    pub fn config(&self) -> &ModulesConfiguration {
        &self.config
    }

    pub fn toggle(&mut self, module: SensorModule) -> bool {
        self.config.toggle(module)
    }

    pub fn set_frequency(&mut self, module: SensorModule, hz: f32) -> bool {
        self.config.set_frequency(module, hz)
    }

    /// Logging needs a resolved device and at least one sensor.
    pub fn can_start(&self) -> bool {
        !self.devices.is_empty() && !self.config.is_empty()
    }

    /// Hand the finished configuration over to the action screen.
    pub fn into_config(self) -> ModulesConfiguration {
        self.config
    }
}
