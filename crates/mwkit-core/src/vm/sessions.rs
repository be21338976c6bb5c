// ── Past sessions view-model ──

use std::sync::Arc;

use dashmap::DashSet;
use tracing::debug;

use crate::action::{Action, ActionQueue, ActionResult};
use crate::error::CoreError;
use crate::model::{Session, SessionExport, SessionId};
use crate::registry::Registry;
use crate::subscription::Subscription;

/// List of recorded sessions, newest first, with rename, delete and
/// download.
pub struct HistoricalSessionsVm {
    sessions: Vec<Session>,
    downloading: Arc<DashSet<SessionId>>,
    registry: Arc<dyn Registry>,
    actions: ActionQueue,
    subscription: Option<Subscription>,
}

impl HistoricalSessionsVm {
    pub(crate) fn new(registry: Arc<dyn Registry>, actions: ActionQueue) -> Self {
        let mut vm = Self {
            sessions: Vec::new(),
            downloading: Arc::new(DashSet::new()),
            registry,
            actions,
            subscription: None,
        };
        vm.refresh();
        vm
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_downloading(&self, id: &SessionId) -> bool {
        self.downloading.contains(id)
    }

    pub fn on_appear(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(Subscription::new("sessions", self.registry.subscribe()));
        }
        self.refresh();
    }

    pub fn on_disappear(&mut self) {
        self.subscription = None;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Re-read sessions, newest first (ties broken by name).
    pub fn refresh(&mut self) {
        let mut sessions = self.registry.sessions();
        sessions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));
        self.sessions = sessions;
    }

    pub fn rename(&mut self, id: &SessionId, name: &str) -> Result<(), CoreError> {
        self.registry.rename_session(id, name)?;
        self.refresh();
        Ok(())
    }

    pub fn delete(&mut self, id: &SessionId) -> Result<(), CoreError> {
        self.registry.delete_session(id)?;
        self.refresh();
        Ok(())
    }

    /// Export a session through the action queue. A second request for a
    /// session already downloading is rejected.
    pub async fn download(&self, id: &SessionId) -> Result<SessionExport, CoreError> {
        let Some(_in_flight) = InFlight::claim(&self.downloading, *id) else {
            return Err(CoreError::ValidationFailed {
                message: format!("session {id} is already downloading"),
            });
        };
        debug!(%id, "downloading session");

        match self.actions.execute(Action::DownloadSession { id: *id }).await? {
            ActionResult::Export(export) => Ok(export),
            ActionResult::Ok => Err(CoreError::Internal(
                "download finished without an export".into(),
            )),
        }
    }
}

/// Marks a session as downloading until dropped, so a cancelled or
/// timed-out caller doesn't leave the flag set.
struct InFlight<'a> {
    set: &'a DashSet<SessionId>,
    id: SessionId,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a DashSet<SessionId>, id: SessionId) -> Option<Self> {
        set.insert(id).then_some(Self { set, id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}
