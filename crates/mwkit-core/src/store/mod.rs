// ── In-memory registry ──
//
// Lock-free entity storage with push-based change notification.

mod collection;
mod device_store;
mod snapshot;

pub use device_store::DeviceStore;
pub use snapshot::RegistrySnapshot;
