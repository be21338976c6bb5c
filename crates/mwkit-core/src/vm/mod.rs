// ── View-models ──
//
// Per-screen adapters over the registry. None of them cache registry state
// beyond the screen's subscription; `refresh` always re-reads.

pub mod aggregate;
mod about;
mod action_log;
mod history;
mod item;
mod sensor_config;
mod sessions;
mod unknown;

pub use about::AboutDeviceVm;
pub use action_log::{ActionLogVm, ActionState};
pub use history::HistoryScreenVm;
pub use item::{ItemSource, KnownItemVm};
pub use sensor_config::SensorConfigurationVm;
pub use sessions::HistoricalSessionsVm;
pub use unknown::{UNKNOWN_DEVICE_NAME, UnknownDeviceVm};
