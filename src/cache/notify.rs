//! Push notifications.
//!
//! A push carries `{title, body}`. Every notification uses the same tag so a
//! newer one replaces the previous instead of stacking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const NOTIFICATION_TAG: &str = "portfolio-update";
const DEFAULT_TITLE: &str = "Portfolio";
const DEFAULT_BODY: &str = "New content is available";
const ROOT_URL: &str = "/";

#[derive(Debug, Clone, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub icon: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build from raw push data. Unparseable payloads still notify, with
    /// default text.
    pub fn from_push(data: &[u8]) -> Self {
        let payload = serde_json::from_slice::<PushPayload>(data).unwrap_or_else(|e| {
            tracing::debug!("Push payload is not JSON ({}), using defaults", e);
            PushPayload {
                title: None,
                body: None,
            }
        });
        Self {
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            tag: NOTIFICATION_TAG.to_string(),
            icon: "/images/icon-192.png".to_string(),
            actions: vec![
                NotificationAction {
                    action: "view".to_string(),
                    title: "View".to_string(),
                },
                NotificationAction {
                    action: "close".to_string(),
                    title: "Close".to_string(),
                },
            ],
        }
    }
}

/// Notifications currently displayed, one per tag.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    shown: Arc<Mutex<HashMap<String, Notification>>>,
}

impl NotificationCenter {
    /// Display `notification`, replacing any with the same tag.
    pub fn show(&self, notification: Notification) {
        let mut shown = self.shown.lock().expect("notification lock poisoned");
        shown.insert(notification.tag.clone(), notification);
    }

    pub fn dismiss(&self, tag: &str) -> bool {
        let mut shown = self.shown.lock().expect("notification lock poisoned");
        shown.remove(tag).is_some()
    }

    pub fn visible(&self) -> Vec<Notification> {
        let shown = self.shown.lock().expect("notification lock poisoned");
        shown.values().cloned().collect()
    }
}

/// Open pages the cache layer can focus or open.
#[async_trait]
pub trait ClientWindows: Send + Sync {
    /// Focus an open page at `url`; false when none is open.
    async fn focus(&self, url: &str) -> bool;
    async fn open(&self, url: &str) -> bool;
}

/// Something open pages should do, queued until a page polls for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    Focus { url: String },
    Open { url: String },
}

#[derive(Debug, Default)]
struct QueueInner {
    /// A page has polled at least once, so a focus request can land.
    attached: bool,
    commands: Vec<ClientCommand>,
}

/// Pages served through the proxy, reached by polling for commands.
#[derive(Debug, Clone, Default)]
pub struct ClientQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl ClientQueue {
    /// Hand pending commands to a polling page.
    pub fn drain(&self) -> Vec<ClientCommand> {
        let mut inner = self.inner.lock().expect("client queue lock poisoned");
        inner.attached = true;
        std::mem::take(&mut inner.commands)
    }

    fn push(&self, command: ClientCommand) {
        let mut inner = self.inner.lock().expect("client queue lock poisoned");
        inner.commands.push(command);
    }

    fn attached(&self) -> bool {
        self.inner.lock().expect("client queue lock poisoned").attached
    }
}

#[async_trait]
impl ClientWindows for ClientQueue {
    async fn focus(&self, url: &str) -> bool {
        if !self.attached() {
            return false;
        }
        self.push(ClientCommand::Focus {
            url: url.to_string(),
        });
        true
    }

    async fn open(&self, url: &str) -> bool {
        self.push(ClientCommand::Open {
            url: url.to_string(),
        });
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickOutcome {
    Focused,
    Opened,
    Dismissed,
    Failed,
}

/// React to a click on a notification. `view` (or the body itself) brings
/// the root page forward, focusing an open one before opening a new one.
pub async fn handle_click(
    center: &NotificationCenter,
    tag: &str,
    action: Option<&str>,
    clients: &dyn ClientWindows,
) -> ClickOutcome {
    center.dismiss(tag);
    match action {
        Some("close") => ClickOutcome::Dismissed,
        Some("view") | None => {
            if clients.focus(ROOT_URL).await {
                ClickOutcome::Focused
            } else if clients.open(ROOT_URL).await {
                ClickOutcome::Opened
            } else {
                ClickOutcome::Failed
            }
        }
        Some(other) => {
            tracing::debug!("Ignoring unknown notification action {}", other);
            ClickOutcome::Dismissed
        }
    }
}
