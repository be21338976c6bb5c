// ── Registry subscriptions ──
//
// Screen-scoped handle on the registry's change feed. A view-model takes
// one on appearance and drops it on disappearance; dropping is the only
// release step, so every exit path releases it.

use tokio::sync::watch;
use tracing::trace;

/// A live subscription to registry changes.
///
/// Wraps the registry's version channel. [`changed`](Self::changed) waits
/// for the next mutation; [`has_changed`](Self::has_changed) polls.
pub struct Subscription {
    label: String,
    receiver: watch::Receiver<u64>,
}

impl Subscription {
    pub(crate) fn new(label: impl Into<String>, mut receiver: watch::Receiver<u64>) -> Self {
        let label = label.into();
        // Start from the current version so only later mutations count.
        receiver.borrow_and_update();
        trace!(%label, "subscribed to registry");
        Self { label, receiver }
    }

    /// Version observed when this subscription last caught up.
    pub fn version(&self) -> u64 {
        *self.receiver.borrow()
    }

    /// Whether the registry changed since the last `changed()`/`mark_seen()`.
    /// A closed registry counts as unchanged.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Acknowledge the current version without waiting.
    pub fn mark_seen(&mut self) -> u64 {
        *self.receiver.borrow_and_update()
    }

    /// Wait for the next change, returning the new version.
    /// Returns `None` if the registry has been dropped.
    pub async fn changed(&mut self) -> Option<u64> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        trace!(label = %self.label, "released registry subscription");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn changed_yields_new_version() {
        let (tx, rx) = watch::channel(0u64);
        let mut sub = Subscription::new("test", rx);
        assert!(!sub.has_changed());

        tx.send_modify(|v| *v += 1);
        assert!(sub.has_changed());
        assert_eq!(sub.changed().await, Some(1));
        assert!(!sub.has_changed());
    }

    #[tokio::test]
    async fn changed_returns_none_when_registry_dropped() {
        let (tx, rx) = watch::channel(0u64);
        let mut sub = Subscription::new("test", rx);
        drop(tx);
        assert_eq!(sub.changed().await, None);
    }

    #[test]
    fn dropping_subscription_releases_receiver() {
        let (tx, rx) = watch::channel(0u64);
        let sub = Subscription::new("test", rx);
        assert_eq!(tx.receiver_count(), 1);
        drop(sub);
        assert_eq!(tx.receiver_count(), 0);
    }

    #[test]
    fn mark_seen_clears_pending_change() {
        let (tx, rx) = watch::channel(0u64);
        let mut sub = Subscription::new("test", rx);
        tx.send_modify(|v| *v += 5);
        assert_eq!(sub.mark_seen(), 5);
        assert!(!sub.has_changed());
    }
}
