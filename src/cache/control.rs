//! Control protocol of the cache layer.
//!
//! Pages talk to the cache through messages that each carry a reply
//! channel. Every message is answered exactly once.

use axum::body::Bytes;
use axum::http::{Request, Response};
use tokio::sync::{mpsc, oneshot};
use tower::{BoxError, Service};

use super::worker::{ResourceCache, WorkerState};

#[derive(Debug)]
pub enum ControlMessage {
    /// Activate an installed version now instead of waiting for a reload.
    SkipWaiting { reply: oneshot::Sender<WorkerState> },
    GetVersion { reply: oneshot::Sender<String> },
    /// Delete every bucket; replies whether it succeeded.
    ClearCache { reply: oneshot::Sender<bool> },
}

/// Sending half of the control channel.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<ControlMessage>,
}

impl ControlHandle {
    pub async fn skip_waiting(&self) -> Option<WorkerState> {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::SkipWaiting { reply }).await;
        rx.await.ok()
    }

    pub async fn version(&self) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::GetVersion { reply }).await;
        rx.await.ok()
    }

    pub async fn clear(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::ClearCache { reply }).await;
        rx.await.unwrap_or(false)
    }

    async fn send(&self, message: ControlMessage) {
        if self.tx.send(message).await.is_err() {
            tracing::warn!("Cache control loop has stopped");
        }
    }
}

/// Spawn the loop that answers control messages for `cache`.
pub fn spawn_control<S>(cache: ResourceCache<S>) -> ControlHandle
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = BoxError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            // A dropped receiver just means the page went away.
            match message {
                ControlMessage::SkipWaiting { reply } => {
                    let _ = reply.send(cache.skip_waiting());
                }
                ControlMessage::GetVersion { reply } => {
                    let _ = reply.send(cache.version().to_string());
                }
                ControlMessage::ClearCache { reply } => {
                    let _ = reply.send(cache.clear_all());
                }
            }
        }
        tracing::debug!("Cache control channel closed");
    });
    ControlHandle { tx }
}
