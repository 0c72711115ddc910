use super::audit::AuditLog;
use crate::{
    error::{HubError, HubResult},
    ipc::message::OutboundMessage,
};

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};
use tokio::sync::{mpsc, Mutex};

/// Write side of one client connection. The receiving end lives in that
/// connection's writer task; a failed send means the task is gone.
pub type Sink = mpsc::UnboundedSender<String>;

/// Issues process-unique client identities. Ids are never reused.
#[derive(Default)]
pub struct IdAllocator {
    counter: AtomicU64,
}

impl IdAllocator {
    pub fn next(&self) -> String {
        format!("user_{}", self.counter.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// The authoritative set of live connections. The only state shared between
/// connection tasks and the broadcaster.
pub struct Registry {
    connections: Mutex<HashMap<String, Sink>>,
    allocator: IdAllocator,
    live_count: AtomicUsize,
    audit: Option<AuditLog>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            connections: Mutex::new(HashMap::new()),
            allocator: IdAllocator::default(),
            live_count: AtomicUsize::new(0),
            audit: None,
        }
    }

    pub fn with_audit(audit: AuditLog) -> Self {
        Registry {
            audit: Some(audit),
            ..Self::new()
        }
    }

    /// Store a sink under a freshly allocated id. Audit failures are logged
    /// and never block the registration.
    pub async fn register(&self, sink: Sink) -> String {
        let id = self.allocator.next();

        self.connections.lock().await.insert(id.clone(), sink);
        self.live_count.fetch_add(1, Ordering::Relaxed);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.record_added(&id).await {
                log::warn!("Audit sink failed to record {id}: {e}");
            }
        }

        id
    }

    /// Remove an entry if present. Idempotent.
    pub async fn unregister(&self, id: &str) {
        if self.connections.lock().await.remove(id).is_none() {
            return;
        }
        self.live_count.fetch_sub(1, Ordering::Relaxed);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.record_removed(id).await {
                log::warn!("Audit sink failed to forget {id}: {e}");
            }
        }
    }

    /// Deliver a message to one recipient. A dead sink gets unregistered as
    /// a side effect.
    pub async fn send_to(&self, id: &str, message: &OutboundMessage) -> HubResult<()> {
        let sink = self.connections.lock().await.get(id).cloned();
        let sink = sink.ok_or(HubError::UnknownRecipient)?;

        let payload = serde_json::to_string(message)?;
        if sink.send(payload).is_err() {
            log::info!("Client {id} is disconnected. Removing.");
            self.unregister(id).await;
            return Err(HubError::DeliveryError);
        }

        Ok(())
    }

    /// Deliver a message to every connection in a snapshot of the current
    /// membership. The lock is released before any delivery, and one dead
    /// recipient never blocks the rest. Returns the delivered count.
    pub async fn broadcast(&self, message: &OutboundMessage) -> HubResult<usize> {
        let payload = serde_json::to_string(message)?;

        let snapshot: Vec<(String, Sink)> = {
            let connections = self.connections.lock().await;
            connections
                .iter()
                .map(|(id, sink)| (id.clone(), sink.clone()))
                .collect()
        };

        let mut disconnected = Vec::new();
        for (id, sink) in &snapshot {
            if sink.send(payload.clone()).is_err() {
                log::debug!("Client {id} is disconnected.");
                disconnected.push(id.clone());
            }
        }

        let delivered = snapshot.len() - disconnected.len();
        for id in disconnected {
            log::info!("Remove client: {id}");
            self.unregister(&id).await;
        }

        Ok(delivered)
    }

    /// Current live membership size. Lock-free, for the status probe.
    pub fn count(&self) -> usize {
        self.live_count.load(Ordering::Relaxed)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
