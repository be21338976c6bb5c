// ── Sensor configuration ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Sensor modules that can be programmed for logging.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SensorModule {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    #[strum(to_string = "Sensor Fusion", serialize = "SensorFusion")]
    SensorFusion,
    Barometer,
    Thermometer,
    #[strum(to_string = "Ambient Light", serialize = "AmbientLight")]
    AmbientLight,
    Humidity,
}

impl SensorModule {
    /// Sampling rate used when a module is first enabled.
    pub fn default_frequency_hz(self) -> f32 {
        match self {
            Self::Accelerometer | Self::Gyroscope | Self::SensorFusion => 100.0,
            Self::Magnetometer => 25.0,
            Self::Barometer | Self::AmbientLight => 1.0,
            Self::Thermometer | Self::Humidity => 0.1,
        }
    }
}

/// Enabled modules and their sampling rates (Hz).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulesConfiguration {
    modules: BTreeMap<SensorModule, f32>,
}

impl ModulesConfiguration {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn is_enabled(&self, module: SensorModule) -> bool {
        self.modules.contains_key(&module)
    }

    pub fn frequency(&self, module: SensorModule) -> Option<f32> {
        self.modules.get(&module).copied()
    }

    pub fn enable(&mut self, module: SensorModule) {
        self.modules
            .entry(module)
            .or_insert_with(|| module.default_frequency_hz());
    }

    pub fn disable(&mut self, module: SensorModule) {
        self.modules.remove(&module);
    }

    /// Flip a module on or off. Returns the new enabled state.
    pub fn toggle(&mut self, module: SensorModule) -> bool {
        if self.is_enabled(module) {
            self.disable(module);
            false
        } else {
            self.enable(module);
            true
        }
    }

    /// Set a sampling rate, enabling the module if needed. Non-positive
    /// or non-finite rates are ignored.
    pub fn set_frequency(&mut self, module: SensorModule, hz: f32) -> bool {
        if !hz.is_finite() || hz <= 0.0 {
            return false;
        }
        self.modules.insert(module, hz);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (SensorModule, f32)> + '_ {
        self.modules.iter().map(|(m, hz)| (*m, *hz))
    }
}
