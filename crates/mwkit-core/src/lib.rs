//! View-model layer between routing and a MetaWear device registry.
//!
//! - **[`UiFactory`]**: Resolves a routing [`Item`] (one device by MAC, or
//!   one group by id) against an injected [`Registry`] and builds the
//!   view-model for it. The chooser path ([`UiFactory::make_item_vm`])
//!   panics on an unknown identity; the aggregate path
//!   ([`UiFactory::known_devices`]) degrades to `("Error", [])`.
//!
//! - **[`KnownItemVm`]**: One read surface (`name`, `is_group`, `models`,
//!   `macs`, `rssi`, `connection`, `is_locally_known`) over a solo device
//!   or a group. Group values fold members through [`vm::aggregate`].
//!
//! - **[`DeviceStore`]**: Lock-free in-memory [`Registry`] with a
//!   `watch`-channel version counter, seedable from a [`RegistrySnapshot`].
//!
//! - **[`ActionQueue`]**: Serial background executor for downloads,
//!   factory resets and logging setup.
//!
//! - **[`Subscription`]**: Screen-scoped handle on registry changes,
//!   released on drop.

pub mod action;
pub mod config;
pub mod error;
pub mod factory;
pub mod model;
pub mod registry;
pub mod store;
pub mod subscription;
pub mod vm;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{Action, ActionQueue, ActionResult};
pub use config::FactoryConfig;
pub use error::CoreError;
pub use factory::{UNRESOLVED_TITLE, UiFactory};
pub use registry::Registry;
pub use store::{DeviceStore, RegistrySnapshot};
pub use subscription::Subscription;
pub use vm::{
    AboutDeviceVm, ActionLogVm, ActionState, HistoricalSessionsVm, HistoryScreenVm, ItemSource,
    KnownItemVm, SensorConfigurationVm, UNKNOWN_DEVICE_NAME, UnknownDeviceVm,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ConnectionState, DeviceGroup, DeviceMetadata, GroupId, Item, KnownDevice, MacAddress, Model,
    ModulesConfiguration, PeripheralId, SensorModule, Session, SessionExport, SessionId,
    SignalLevel,
};
