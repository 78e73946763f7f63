//! Local offline-first proxy.
//!
//! Serves a deployed portfolio through the [`ResourceCache`], so pages keep
//! working from cache when the origin is unreachable. The cache control
//! protocol and the push surface are exposed under `/__cache/`; pages poll
//! `/__cache/client-commands` for the focus/open requests a notification
//! click produces.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower::{BoxError, Service};
use tower_http::trace::TraceLayer;

use crate::cache::{
    handle_click, ClickOutcome, ClientCommand, ClientQueue, ControlHandle, Notification,
    NotificationCenter, ResourceCache, NOTIFICATION_TAG,
};

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub struct ProxyState<S> {
    pub cache: ResourceCache<S>,
    pub control: ControlHandle,
    pub notifications: NotificationCenter,
    pub clients: ClientQueue,
}

impl<S: Clone> Clone for ProxyState<S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            control: self.control.clone(),
            notifications: self.notifications.clone(),
            clients: self.clients.clone(),
        }
    }
}

pub fn proxy_router<S>(state: ProxyState<S>) -> Router
where
    S: Service<axum::http::Request<Bytes>, Response = Response<Bytes>, Error = BoxError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    let control = Router::new()
        .route("/skip-waiting", post(skip_waiting::<S>))
        .route("/version", get(version::<S>))
        .route("/clear", post(clear::<S>))
        .route("/push", post(push::<S>))
        .route("/notifications", get(notifications::<S>))
        .route("/notification-click", post(notification_click::<S>))
        .route("/client-commands", get(client_commands::<S>));

    Router::new()
        .nest("/__cache", control)
        .fallback(forward::<S>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn forward<S>(State(state): State<ProxyState<S>>, request: Request) -> Response<Body>
where
    S: Service<axum::http::Request<Bytes>, Response = Response<Bytes>, Error = BoxError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    let (mut parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Could not read request body: {}", e);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };
    // Upstream is always the cache's origin; keep only path and query.
    if let Some(path) = parts.uri.path_and_query().cloned() {
        parts.uri = axum::http::Uri::from(path);
    }
    parts.headers.remove(header::HOST);
    let request = axum::http::Request::from_parts(parts, body);

    match state.cache.handle(request).await {
        Ok(response) => response.map(Body::from),
        Err(e) => {
            tracing::warn!("Upstream request failed: {}", e);
            (StatusCode::BAD_GATEWAY, "Upstream unavailable").into_response()
        }
    }
}

async fn skip_waiting<S>(State(state): State<ProxyState<S>>) -> impl IntoResponse {
    Json(serde_json::json!({ "state": state.control.skip_waiting().await }))
}

async fn version<S>(State(state): State<ProxyState<S>>) -> impl IntoResponse {
    Json(serde_json::json!({ "version": state.control.version().await }))
}

async fn clear<S>(State(state): State<ProxyState<S>>) -> impl IntoResponse {
    Json(serde_json::json!({ "success": state.control.clear().await }))
}

async fn push<S>(State(state): State<ProxyState<S>>, body: Bytes) -> Json<Notification> {
    let notification = Notification::from_push(&body);
    state.notifications.show(notification.clone());
    Json(notification)
}

async fn notifications<S>(State(state): State<ProxyState<S>>) -> Json<Vec<Notification>> {
    Json(state.notifications.visible())
}

#[derive(Debug, Deserialize)]
struct ClickInput {
    tag: Option<String>,
    action: Option<String>,
}

async fn notification_click<S>(
    State(state): State<ProxyState<S>>,
    Json(input): Json<ClickInput>,
) -> Json<serde_json::Value> {
    let outcome: ClickOutcome = handle_click(
        &state.notifications,
        input.tag.as_deref().unwrap_or(NOTIFICATION_TAG),
        input.action.as_deref(),
        &state.clients,
    )
    .await;
    Json(serde_json::json!({ "outcome": outcome }))
}

async fn client_commands<S>(State(state): State<ProxyState<S>>) -> Json<Vec<ClientCommand>> {
    Json(state.clients.drain())
}
