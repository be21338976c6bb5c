#![allow(clippy::unwrap_used)]
// Action queue ordering, shutdown and in-flight download tracking against a
// registry whose long-running operations wait for the test to release them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use mwkit_core::{
    Action, ActionQueue, ActionResult, ConnectionState, CoreError, DeviceGroup, DeviceMetadata,
    DeviceStore, FactoryConfig, GroupId, KnownDevice, MacAddress, Model, ModulesConfiguration,
    PeripheralId, Registry, Session, SessionExport, SessionId, UiFactory,
};

// ── Gated registry ──────────────────────────────────────────────────

/// Delegates to a `DeviceStore`, but every long-running operation reports
/// that it started and then blocks until the test releases it.
struct GatedRegistry {
    inner: DeviceStore,
    started: mpsc::UnboundedSender<&'static str>,
    release: Mutex<mpsc::UnboundedReceiver<()>>,
}

/// Test side of a [`GatedRegistry`].
struct Gate {
    started: mpsc::UnboundedReceiver<&'static str>,
    release: mpsc::UnboundedSender<()>,
}

impl GatedRegistry {
    fn wrap(inner: DeviceStore) -> (Arc<Self>, Gate) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = mpsc::unbounded_channel();
        let registry = Arc::new(Self {
            inner,
            started: started_tx,
            release: Mutex::new(release_rx),
        });
        let gate = Gate {
            started: started_rx,
            release: release_tx,
        };
        (registry, gate)
    }

    fn hold(&self, op: &'static str) {
        let _ = self.started.send(op);
        self.release.lock().unwrap().blocking_recv();
    }
}

impl Registry for GatedRegistry {
    fn device_and_metadata(&self, mac: &MacAddress) -> Option<KnownDevice> {
        self.inner.device_and_metadata(mac)
    }

    fn group(&self, id: &GroupId) -> Option<DeviceGroup> {
        self.inner.group(id)
    }

    fn devices_in_group(&self, group: &DeviceGroup) -> Vec<KnownDevice> {
        self.inner.devices_in_group(group)
    }

    fn devices(&self) -> Vec<KnownDevice> {
        self.inner.devices()
    }

    fn groups(&self) -> Vec<DeviceGroup> {
        self.inner.groups()
    }

    fn sessions(&self) -> Vec<Session> {
        self.inner.sessions()
    }

    fn rename_device(&self, mac: &MacAddress, name: &str) -> Result<(), CoreError> {
        self.inner.rename_device(mac, name)
    }

    fn rename_group(&self, id: &GroupId, name: &str) -> Result<(), CoreError> {
        self.inner.rename_group(id, name)
    }

    fn create_group(&self, name: &str, members: &[MacAddress]) -> Result<GroupId, CoreError> {
        self.inner.create_group(name, members)
    }

    fn disband_group(&self, id: &GroupId) -> Result<(), CoreError> {
        self.inner.disband_group(id)
    }

    fn forget_locally(&self, mac: &MacAddress) -> Result<(), CoreError> {
        self.inner.forget_locally(mac)
    }

    fn forget_globally(&self, mac: &MacAddress) -> Result<(), CoreError> {
        self.inner.forget_globally(mac)
    }

    fn connect(&self, mac: &MacAddress) -> Result<(), CoreError> {
        self.inner.connect(mac)
    }

    fn rename_session(&self, id: &SessionId, name: &str) -> Result<(), CoreError> {
        self.inner.rename_session(id, name)
    }

    fn delete_session(&self, id: &SessionId) -> Result<(), CoreError> {
        self.inner.delete_session(id)
    }

    fn export_session(&self, id: &SessionId) -> Result<SessionExport, CoreError> {
        self.hold("export_session");
        self.inner.export_session(id)
    }

    fn factory_reset(&self, mac: &MacAddress) -> Result<(), CoreError> {
        self.hold("factory_reset");
        self.inner.factory_reset(mac)
    }

    fn start_logging(
        &self,
        mac: &MacAddress,
        config: &ModulesConfiguration,
    ) -> Result<(), CoreError> {
        self.hold("start_logging");
        self.inner.start_logging(mac, config)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.subscribe()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn seeded_store() -> (DeviceStore, SessionId) {
    let store = DeviceStore::new();
    store.upsert_device(KnownDevice {
        local_id: Some(PeripheralId::new_v4()),
        meta: DeviceMetadata {
            mac: MacAddress::new("AA:BB"),
            serial: "SN1".into(),
            model: Model::MetaMotionS,
            name: "Sensor1".into(),
        },
        connection: ConnectionState::Connected,
        rssi: Some(-50),
    });
    let id = SessionId::new_v4();
    store.insert_session(
        Session {
            id,
            name: "Morning".into(),
            date: Utc::now(),
            devices: vec![MacAddress::new("AA:BB")],
        },
        Some(b"t,x\n0,1\n".to_vec()),
    );
    (store, id)
}

fn spawn_reset(queue: &ActionQueue) -> JoinHandle<Result<ActionResult, CoreError>> {
    let queue = queue.clone();
    tokio::spawn(async move {
        queue
            .execute(Action::FactoryReset {
                mac: MacAddress::new("AA:BB"),
            })
            .await
    })
}

// ── Shutdown ────────────────────────────────────────────────────────

#[tokio::test]
async fn shutdown_cancels_queued_actions_but_finishes_the_running_one() {
    let (store, _) = seeded_store();
    let (registry, mut gate) = GatedRegistry::wrap(store);
    let queue = ActionQueue::new(registry.clone(), 8);

    let running = spawn_reset(&queue);
    assert_eq!(gate.started.recv().await, Some("factory_reset"));

    let queued = [spawn_reset(&queue), spawn_reset(&queue)];
    tokio::time::sleep(Duration::from_millis(50)).await;

    let shutdown = tokio::spawn({
        let queue = queue.clone();
        async move { queue.shutdown().await }
    });
    while !queue.is_shut_down() {
        tokio::task::yield_now().await;
    }
    gate.release.send(()).unwrap();
    shutdown.await.unwrap();

    assert!(matches!(running.await.unwrap(), Ok(ActionResult::Ok)));
    for handle in queued {
        assert!(matches!(handle.await.unwrap(), Err(CoreError::Cancelled)));
    }
    assert!(gate.started.try_recv().is_err());
    assert_eq!(
        registry
            .device_and_metadata(&MacAddress::new("AA:BB"))
            .unwrap()
            .connection,
        ConnectionState::Disconnected
    );
}

// ── Session downloads ───────────────────────────────────────────────

#[tokio::test]
async fn second_download_of_same_session_is_rejected_while_first_runs() {
    let (store, id) = seeded_store();
    let (registry, mut gate) = GatedRegistry::wrap(store);
    let factory = UiFactory::new(registry, FactoryConfig::default());
    let vm = factory.make_past_sessions_vm();

    let first = vm.download(&id);
    tokio::pin!(first);
    tokio::select! {
        result = &mut first => panic!("download finished before release: {result:?}"),
        op = gate.started.recv() => assert_eq!(op, Some("export_session")),
    }
    assert!(vm.is_downloading(&id));

    let err = vm.download(&id).await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));

    gate.release.send(()).unwrap();
    let export = first.await.unwrap();
    assert_eq!(export.filename, "Morning.csv");
    assert_eq!(export.bytes, b"t,x\n0,1\n");
    assert!(!vm.is_downloading(&id));
}

#[tokio::test]
async fn abandoned_download_does_not_block_a_retry() {
    let (store, id) = seeded_store();
    let (registry, mut gate) = GatedRegistry::wrap(store);
    let factory = UiFactory::new(registry, FactoryConfig::default());
    let vm = factory.make_past_sessions_vm();

    let abandoned = tokio::time::timeout(Duration::from_millis(20), vm.download(&id)).await;
    assert!(abandoned.is_err());
    assert_eq!(gate.started.recv().await, Some("export_session"));
    assert!(!vm.is_downloading(&id));

    // One release for the abandoned export, one for the retry.
    gate.release.send(()).unwrap();
    gate.release.send(()).unwrap();
    let export = vm.download(&id).await.unwrap();
    assert_eq!(export.filename, "Morning.csv");
    assert!(!vm.is_downloading(&id));
}
