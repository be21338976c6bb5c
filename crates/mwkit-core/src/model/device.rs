// ── Device domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::{MacAddress, PeripheralId};

/// MetaWear hardware model.
///
/// Displays as the marketing name; parses from either the marketing name
/// or the variant name, case-insensitively.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Model {
    #[strum(to_string = "MetaMotion RL", serialize = "MetaMotionRL")]
    MetaMotionRL,
    #[strum(to_string = "MetaMotion S", serialize = "MetaMotionS")]
    MetaMotionS,
    #[strum(to_string = "MetaMotion C", serialize = "MetaMotionC")]
    MetaMotionC,
    #[strum(to_string = "MetaWear R", serialize = "MetaWearR")]
    MetaWearR,
    #[strum(to_string = "MetaWear RG", serialize = "MetaWearRG")]
    MetaWearRG,
    #[strum(to_string = "MetaWear RPro", serialize = "MetaWearRPro")]
    MetaWearRPro,
    #[strum(to_string = "MetaWear C", serialize = "MetaWearC")]
    MetaWearC,
    #[strum(to_string = "MetaWear CPro", serialize = "MetaWearCPro")]
    MetaWearCPro,
    #[strum(to_string = "MetaEnvironment", serialize = "MetaEnvironment")]
    MetaEnvironment,
    #[strum(to_string = "MetaDetector", serialize = "MetaDetector")]
    MetaDetector,
    #[strum(to_string = "MetaHealth", serialize = "MetaHealth")]
    MetaHealth,
    #[strum(to_string = "MetaTracker", serialize = "MetaTracker")]
    MetaTracker,
    #[default]
    #[strum(to_string = "Unknown", serialize = "Unknown")]
    Unknown,
}

/// Bluetooth connection state, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Coarse signal strength bucket shown as signal dots.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
)]
pub enum SignalLevel {
    #[default]
    None,
    Weak,
    Fair,
    Good,
    Excellent,
}

impl SignalLevel {
    /// Bucket an RSSI reading (dBm). No reading means no signal.
    pub fn from_rssi(rssi: Option<i32>) -> Self {
        match rssi {
            Some(dbm) if dbm >= -55 => Self::Excellent,
            Some(dbm) if dbm >= -65 => Self::Good,
            Some(dbm) if dbm >= -75 => Self::Fair,
            Some(dbm) if dbm >= -85 => Self::Weak,
            _ => Self::None,
        }
    }

    /// Number of lit dots out of four.
    pub fn dots(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Weak => 1,
            Self::Fair => 2,
            Self::Good => 3,
            Self::Excellent => 4,
        }
    }
}

/// Persistent, user-editable description of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub mac: MacAddress,
    pub serial: String,
    #[serde(default)]
    pub model: Model,
    pub name: String,
}

/// A device the registry knows about, with its live transport attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownDevice {
    /// Local peripheral handle. `None` when the record only arrived
    /// through cloud sync and this host has never seen the device.
    #[serde(default)]
    pub local_id: Option<PeripheralId>,
    pub meta: DeviceMetadata,
    #[serde(default)]
    pub connection: ConnectionState,
    /// Last RSSI reading in dBm.
    #[serde(default)]
    pub rssi: Option<i32>,
}

impl KnownDevice {
    pub fn mac(&self) -> &MacAddress {
        &self.meta.mac
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn is_locally_known(&self) -> bool {
        self.local_id.is_some()
    }

    pub fn signal(&self) -> SignalLevel {
        SignalLevel::from_rssi(self.rssi)
    }
}
