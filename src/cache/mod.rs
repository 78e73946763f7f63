//! Offline-first resource cache.
//!
//! Every outbound request of the site goes through [`ResourceCache`], which
//! classifies it ([`classify`]) and serves it with the strategy for its
//! class ([`plan_for`]): cache-first for images and the site shell,
//! network-first for demo documents, stale-while-revalidate for everything
//! else. Handled requests never fail; when both network and cache come up
//! empty the layer answers with a placeholder, a `503`, or the offline page.

mod classify;
mod control;
mod layer;
mod network;
mod notify;
mod offline;
mod storage;
mod strategy;
mod worker;

pub use classify::{classify, Disposition, ResourceClass, Scope};
pub use control::{spawn_control, ControlHandle, ControlMessage};
pub use layer::CacheLayer;
pub use network::HttpNetwork;
pub use notify::{
    handle_click, ClickOutcome, ClientCommand, ClientQueue, ClientWindows, Notification,
    NotificationAction, NotificationCenter, PushPayload, NOTIFICATION_TAG,
};
pub use offline::{offline_page, unavailable, OFFLINE_PAGE};
pub use storage::{BucketKind, CacheStorage, CachedResponse};
pub use strategy::{plan_for, Fallback, Plan, Strategy};
pub use worker::{InstallReport, ResourceCache, WorkerState};
