// ── Action queue ──
//
// Long-running device operations (session downloads, factory resets,
// logging setup) run one at a time on a dedicated worker task. Each
// request carries a oneshot reply channel. Reads never go through here.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{MacAddress, ModulesConfiguration, SessionExport, SessionId};
use crate::registry::Registry;

/// A long-running operation against one resolved identity.
#[derive(Debug, Clone)]
pub enum Action {
    DownloadSession {
        id: SessionId,
    },
    FactoryReset {
        mac: MacAddress,
    },
    StartLogging {
        mac: MacAddress,
        config: ModulesConfiguration,
    },
}

/// Result of an action execution.
#[derive(Debug)]
pub enum ActionResult {
    Ok,
    Export(SessionExport),
}

/// An action envelope sent through the queue channel.
struct ActionEnvelope {
    action: Action,
    response_tx: oneshot::Sender<Result<ActionResult, CoreError>>,
}

/// Serial executor for long-running registry operations.
///
/// Cheaply cloneable. The worker task is spawned lazily on the first
/// [`execute`](Self::execute), so constructing a queue doesn't need a
/// runtime. Queued actions that haven't started when
/// [`shutdown`](Self::shutdown) is called fail with
/// [`CoreError::Cancelled`]; an action already running completes.
#[derive(Clone)]
pub struct ActionQueue {
    inner: Arc<ActionQueueInner>,
}

struct ActionQueueInner {
    registry: Arc<dyn Registry>,
    action_tx: mpsc::Sender<ActionEnvelope>,
    action_rx: Mutex<Option<mpsc::Receiver<ActionEnvelope>>>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ActionQueue {
    pub fn new(registry: Arc<dyn Registry>, capacity: usize) -> Self {
        let (action_tx, action_rx) = mpsc::channel(capacity.max(1));
        Self {
            inner: Arc::new(ActionQueueInner {
                registry,
                action_tx,
                action_rx: Mutex::new(Some(action_rx)),
                cancel: CancellationToken::new(),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Enqueue `action` and wait for its result.
    pub async fn execute(&self, action: Action) -> Result<ActionResult, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::QueueClosed);
        }
        self.ensure_worker().await;

        let (response_tx, response_rx) = oneshot::channel();
        self.inner
            .action_tx
            .send(ActionEnvelope {
                action,
                response_tx,
            })
            .await
            .map_err(|_| CoreError::QueueClosed)?;

        response_rx.await.map_err(|_| CoreError::Cancelled)?
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Stop the worker. Pending actions fail with `Cancelled`.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handle = self.inner.worker.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        // Never started: fail anything that was sent but not received.
        if let Some(mut rx) = self.inner.action_rx.lock().await.take() {
            fail_pending(&mut rx);
        }
        debug!("action queue shut down");
    }

    async fn ensure_worker(&self) {
        let mut worker = self.inner.worker.lock().await;
        if worker.is_some() {
            return;
        }
        if let Some(rx) = self.inner.action_rx.lock().await.take() {
            let registry = Arc::clone(&self.inner.registry);
            let cancel = self.inner.cancel.clone();
            *worker = Some(tokio::spawn(action_worker_task(registry, rx, cancel)));
        }
    }
}

// ── Worker ───────────────────────────────────────────────────────────

async fn action_worker_task(
    registry: Arc<dyn Registry>,
    mut rx: mpsc::Receiver<ActionEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let registry = Arc::clone(&registry);
                let action = envelope.action;
                debug!(?action, "running action");
                let result =
                    tokio::task::spawn_blocking(move || run_action(registry.as_ref(), action))
                        .await
                        .unwrap_or_else(|e| {
                            Err(CoreError::Internal(format!("action panicked: {e}")))
                        });
                if let Err(ref e) = result {
                    warn!(error = %e, "action failed");
                }
                let _ = envelope.response_tx.send(result);
            }
        }
    }

    fail_pending(&mut rx);
}

/// Close the channel and fail every envelope still buffered in it.
fn fail_pending(rx: &mut mpsc::Receiver<ActionEnvelope>) {
    rx.close();
    let mut dropped = 0usize;
    while let Ok(envelope) = rx.try_recv() {
        let _ = envelope.response_tx.send(Err(CoreError::Cancelled));
        dropped += 1;
    }
    if dropped > 0 {
        info!(dropped, "cancelled queued actions");
    }
}

fn run_action(registry: &dyn Registry, action: Action) -> Result<ActionResult, CoreError> {
    match action {
        Action::DownloadSession { id } => registry.export_session(&id).map(ActionResult::Export),
        Action::FactoryReset { mac } => registry.factory_reset(&mac).map(|()| ActionResult::Ok),
        Action::StartLogging { mac, config } => registry
            .start_logging(&mac, &config)
            .map(|()| ActionResult::Ok),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{
        ConnectionState, DeviceMetadata, KnownDevice, Model, PeripheralId, SensorModule,
    };
    use crate::store::DeviceStore;

    fn store_with_device(mac: &str) -> Arc<DeviceStore> {
        let store = Arc::new(DeviceStore::new());
        store.upsert_device(KnownDevice {
            local_id: Some(PeripheralId::new_v4()),
            meta: DeviceMetadata {
                mac: MacAddress::new(mac),
                serial: "SN".into(),
                model: Model::MetaMotionS,
                name: "Sensor".into(),
            },
            connection: ConnectionState::Connected,
            rssi: Some(-50),
        });
        store
    }

    #[tokio::test]
    async fn executes_actions_against_registry() {
        let store = store_with_device("AA:BB");
        let queue = ActionQueue::new(store.clone(), 4);
        let mac = MacAddress::new("AA:BB");
        let mut config = ModulesConfiguration::default();
        config.enable(SensorModule::Gyroscope);

        let result = queue
            .execute(Action::StartLogging {
                mac: mac.clone(),
                config: config.clone(),
            })
            .await
            .unwrap();
        assert!(matches!(result, ActionResult::Ok));
        assert_eq!(store.logging_config(&mac), Some(config));
    }

    #[tokio::test]
    async fn surfaces_registry_errors() {
        let store = store_with_device("AA:BB");
        let queue = ActionQueue::new(store, 4);
        let err = queue
            .execute(Action::FactoryReset {
                mac: MacAddress::new("ZZ:ZZ"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DeviceNotFound { .. }));
    }

    #[tokio::test]
    async fn serializes_concurrent_actions() {
        let store = store_with_device("AA:BB");
        let queue = ActionQueue::new(store.clone(), 8);
        let mut handles = Vec::new();
        for _ in 0..5 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                queue
                    .execute(Action::FactoryReset {
                        mac: MacAddress::new("AA:BB"),
                    })
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }

    #[tokio::test]
    async fn rejects_work_after_shutdown() {
        let store = store_with_device("AA:BB");
        let queue = ActionQueue::new(store, 4);
        queue.shutdown().await;
        assert!(queue.is_shut_down());
        let err = queue
            .execute(Action::FactoryReset {
                mac: MacAddress::new("AA:BB"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::QueueClosed));
    }
}
