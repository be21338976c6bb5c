// ── Runtime factory configuration ──
//
// Tuning knobs for the factory and its action queue. Never touches disk;
// `mwkit-config` builds one of these from the user's TOML and hands it in.

/// Default number of actions that may wait on the queue at once.
pub const DEFAULT_ACTION_QUEUE_CAPACITY: usize = 16;

/// Configuration for a [`UiFactory`](crate::UiFactory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Bound of the action queue's channel. Clamped to at least 1.
    pub action_queue_capacity: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            action_queue_capacity: DEFAULT_ACTION_QUEUE_CAPACITY,
        }
    }
}
