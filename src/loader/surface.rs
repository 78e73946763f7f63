//! The presentation surface a demo is rendered into, and the event plumbing
//! the loader listens on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::overlay::NavBar;

/// Signals a surface raises about its current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Load,
    Error(String),
}

/// Result of probing a surface's content document.
///
/// Probing never fails: cross-origin documents report `Blocked` instead of
/// raising, and a surface without a content window reports `Absent`.
#[derive(Clone)]
pub enum ContentAccess {
    Accessible(Arc<dyn Document>),
    Blocked,
    Absent,
}

impl std::fmt::Debug for ContentAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentAccess::Accessible(_) => f.write_str("Accessible"),
            ContentAccess::Blocked => f.write_str("Blocked"),
            ContentAccess::Absent => f.write_str("Absent"),
        }
    }
}

/// A same-origin document loaded in a surface.
pub trait Document: Send + Sync {
    /// Serialized content of `<body>`.
    fn body_html(&self) -> String;
    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;
    fn set_body_padding_top(&self, px: u32);
    /// Insert `bar` as the first child of `<body>`.
    fn prepend_to_body(&self, bar: NavBar);
}

/// An embedded viewport (iframe-equivalent).
pub trait Surface: Send + Sync {
    /// Point the surface at `url`.
    fn navigate(&self, url: &str);
    /// Drop the current document, stopping any in-flight load.
    fn clear(&self);
    fn events(&self) -> &EventHub;
    fn content(&self) -> ContentAccess;
}

/// Creates the off-screen surfaces used for preloading.
pub trait SurfaceFactory: Send + Sync {
    fn create_hidden(&self) -> Arc<dyn Surface>;
    fn remove(&self, surface: &Arc<dyn Surface>);
}

type Listeners = HashMap<u64, mpsc::UnboundedSender<SurfaceEvent>>;

/// Fan-out of surface events to registered listeners.
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    listeners: Arc<Mutex<Listeners>>,
    next_id: Arc<AtomicU64>,
}

impl EventHub {
    /// Register a listener. It is detached when the returned guard drops.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .insert(id, tx);
        Subscription {
            id,
            rx,
            hub: self.clone(),
        }
    }

    pub fn emit(&self, event: SurfaceEvent) {
        let mut listeners = self.listeners.lock().expect("listener lock poisoned");
        listeners.retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().expect("listener lock poisoned").len()
    }

    fn detach(&self, id: u64) {
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .remove(&id);
    }
}

/// A registered listener; dropping it detaches from the hub.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<SurfaceEvent>,
    hub: EventHub,
}

impl Subscription {
    pub async fn next(&mut self) -> Option<SurfaceEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.detach(self.id);
    }
}
