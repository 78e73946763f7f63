//! The resource cache: lifecycle (install / activate) and the fetch
//! strategies, fronting any network `Service`.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use axum::body::Bytes;
use axum::http::{Request, Response, Uri};
use serde::Serialize;
use tower::{BoxError, Service, ServiceExt};

use super::classify::{classify, Disposition, ResourceClass, Scope};
use super::offline;
use super::storage::{BucketKind, CacheStorage, CachedResponse};
use super::strategy::{plan_for, Fallback, Plan, Strategy};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::registry::Registry;

/// Lifecycle of one cache version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this version never serves.
    Redundant,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub static_cached: usize,
    pub demos_cached: usize,
    pub demos_skipped: usize,
    pub demos_failed: usize,
}

#[derive(Debug)]
struct Lifecycle {
    state: WorkerState,
    /// Set once activation claims open pages; before that requests pass through.
    controls_clients: bool,
}

pub struct ResourceCache<S> {
    network: S,
    storage: CacheStorage,
    scope: Arc<Scope>,
    config: Arc<CacheConfig>,
    demo_entries: Arc<Vec<String>>,
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl<S: Clone> Clone for ResourceCache<S> {
    fn clone(&self) -> Self {
        Self {
            network: self.network.clone(),
            storage: self.storage.clone(),
            scope: self.scope.clone(),
            config: self.config.clone(),
            demo_entries: self.demo_entries.clone(),
            lifecycle: self.lifecycle.clone(),
        }
    }
}

impl<S> ResourceCache<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = BoxError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    pub fn new(
        network: S,
        storage: CacheStorage,
        scope: Scope,
        config: CacheConfig,
        registry: &Registry,
    ) -> Self {
        let demo_entries = registry.all().iter().map(|p| p.site_path()).collect();
        Self {
            network,
            storage,
            scope: Arc::new(scope),
            config: Arc::new(config),
            demo_entries: Arc::new(demo_entries),
            lifecycle: Arc::new(Mutex::new(Lifecycle {
                state: WorkerState::Parsed,
                controls_clients: false,
            })),
        }
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn state(&self) -> WorkerState {
        self.lifecycle.lock().expect("lifecycle lock poisoned").state
    }

    pub fn controls_clients(&self) -> bool {
        self.lifecycle
            .lock()
            .expect("lifecycle lock poisoned")
            .controls_clients
    }

    fn set_state(&self, state: WorkerState) {
        self.lifecycle.lock().expect("lifecycle lock poisoned").state = state;
    }

    fn bucket(&self, kind: BucketKind) -> String {
        kind.name(&self.config.version)
    }

    // ============================================================
    // Lifecycle
    // ============================================================

    /// Cache the site shell, then warm demo entry documents.
    ///
    /// Any shell asset failing fails the install. Demo documents are best
    /// effort, and those already in the shell list are skipped.
    pub async fn install(&self) -> Result<InstallReport, CacheError> {
        self.set_state(WorkerState::Installing);
        tracing::info!("Installing cache version {}", self.config.version);

        let static_bucket = self.bucket(BucketKind::Static);
        let dynamic_bucket = self.bucket(BucketKind::Dynamic);
        self.storage.open(&static_bucket);
        self.storage.open(&dynamic_bucket);

        let mut report = InstallReport::default();
        for path in &self.config.static_assets {
            let url = self.scope.url(path);
            let stored = match self.fetch(&url).await {
                Ok(response) if response.status().is_success() => self
                    .storage
                    .put(&static_bucket, &url, CachedResponse::from_response(&response)),
                Ok(response) => Err(CacheError::InstallFailed(format!(
                    "{} returned {}",
                    url,
                    response.status()
                ))),
                Err(e) => Err(e),
            };
            if let Err(e) = stored {
                tracing::error!("Install of {} failed: {}", self.config.version, e);
                self.set_state(WorkerState::Redundant);
                return Err(CacheError::InstallFailed(e.to_string()));
            }
            report.static_cached += 1;
        }

        for path in self.demo_entries.iter() {
            if self.scope.is_static_asset(path) {
                report.demos_skipped += 1;
                continue;
            }
            let url = self.scope.url(path);
            match self.fetch(&url).await {
                Ok(response) if response.status().is_success() => {
                    match self.storage.put(
                        &dynamic_bucket,
                        &url,
                        CachedResponse::from_response(&response),
                    ) {
                        Ok(()) => report.demos_cached += 1,
                        Err(e) => {
                            tracing::warn!("Could not pre-cache {}: {}", url, e);
                            report.demos_failed += 1;
                        }
                    }
                }
                Ok(response) => {
                    tracing::warn!("Demo {} returned {} during install", url, response.status());
                    report.demos_failed += 1;
                }
                Err(e) => {
                    tracing::warn!("Could not pre-cache {}: {}", url, e);
                    report.demos_failed += 1;
                }
            }
        }

        self.set_state(WorkerState::Installed);
        tracing::info!(
            "Installed cache {}: {} shell assets, {} demos",
            self.config.version,
            report.static_cached,
            report.demos_cached
        );
        Ok(report)
    }

    /// Purge buckets from other versions and take control of open pages.
    /// Returns the deleted bucket names.
    pub fn activate(&self) -> Vec<String> {
        self.set_state(WorkerState::Activating);

        let current: Vec<String> = BucketKind::ALL.iter().map(|k| self.bucket(*k)).collect();
        let mut deleted = Vec::new();
        for name in self.storage.bucket_names() {
            if !current.contains(&name) && self.storage.delete_bucket(&name) {
                tracing::info!("Deleted stale cache bucket {}", name);
                deleted.push(name);
            }
        }

        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        lifecycle.state = WorkerState::Activated;
        lifecycle.controls_clients = true;
        drop(lifecycle);

        tracing::info!("Cache version {} active", self.config.version);
        deleted
    }

    /// Activate without waiting, if installed.
    pub fn skip_waiting(&self) -> WorkerState {
        if self.state() == WorkerState::Installed {
            self.activate();
        }
        self.state()
    }

    pub fn clear_all(&self) -> bool {
        let removed = self.storage.clear();
        tracing::info!("Cleared {} cache buckets", removed);
        true
    }

    // ============================================================
    // Fetch handling
    // ============================================================

    /// Serve one request. Handled GETs always produce a response; only
    /// pass-through requests can surface a network error.
    pub async fn handle(&self, mut request: Request<Bytes>) -> Result<Response<Bytes>, BoxError> {
        if request.uri().authority().is_none() {
            let absolute: Uri = self.scope.key_for(request.uri()).parse()?;
            *request.uri_mut() = absolute;
        }

        let disposition = if self.controls_clients() {
            classify(request.method(), request.uri(), &self.scope)
        } else {
            Disposition::PassThrough
        };

        match disposition {
            Disposition::PassThrough => self.network.clone().oneshot(request).await,
            Disposition::Handle(class) => Ok(self.respond(class, request).await),
        }
    }

    async fn respond(&self, class: ResourceClass, request: Request<Bytes>) -> Response<Bytes> {
        let plan = plan_for(class);
        let url = request.uri().to_string();
        match plan.strategy {
            Strategy::CacheFirst => self.cache_first(plan, &url, request).await,
            Strategy::NetworkFirst => self.network_first(plan, &url, request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(plan, &url, request).await,
        }
    }

    async fn cache_first(&self, plan: Plan, url: &str, request: Request<Bytes>) -> Response<Bytes> {
        let bucket = self.bucket(plan.bucket);
        if let Some(hit) = self.storage.match_in(&bucket, url) {
            return hit.into_response();
        }

        match self.send(request).await {
            Ok(response) => {
                self.store(&bucket, url, &response);
                response
            }
            Err(e) => {
                tracing::debug!("Cache-first miss for {} while offline: {}", url, e);
                self.fallback(plan.fallback)
            }
        }
    }

    async fn network_first(&self, plan: Plan, url: &str, request: Request<Bytes>) -> Response<Bytes> {
        let bucket = self.bucket(plan.bucket);
        match self.send(request).await {
            Ok(response) => {
                self.store(&bucket, url, &response);
                response
            }
            Err(e) => {
                tracing::debug!("Network-first fetch of {} failed: {}", url, e);
                match self.storage.match_any(url) {
                    Some(hit) => hit.into_response(),
                    None => self.fallback(plan.fallback),
                }
            }
        }
    }

    async fn stale_while_revalidate(
        &self,
        plan: Plan,
        url: &str,
        request: Request<Bytes>,
    ) -> Response<Bytes> {
        let bucket = self.bucket(plan.bucket);
        if let Some(hit) = self.storage.match_in(&bucket, url) {
            let this = self.clone();
            let url = url.to_string();
            tokio::spawn(async move {
                match this.send(request).await {
                    Ok(response) => this.store(&bucket, &url, &response),
                    Err(e) => tracing::debug!("Background refresh of {} failed: {}", url, e),
                }
            });
            return hit.into_response();
        }

        match self.send(request).await {
            Ok(response) => {
                self.store(&bucket, url, &response);
                response
            }
            Err(e) => {
                tracing::debug!("Fetch of {} failed with nothing cached: {}", url, e);
                self.fallback(plan.fallback)
            }
        }
    }

    /// Store successful responses; a failed write is logged and ignored.
    fn store(&self, bucket: &str, url: &str, response: &Response<Bytes>) {
        if !response.status().is_success() {
            return;
        }
        if let Err(e) = self
            .storage
            .put(bucket, url, CachedResponse::from_response(response))
        {
            tracing::warn!("Cache write skipped: {}", e);
        }
    }

    fn fallback(&self, fallback: Fallback) -> Response<Bytes> {
        match fallback {
            Fallback::OfflinePage => offline::offline_page(),
            Fallback::PlaceholderImage => {
                let placeholder = self.scope.url(&self.config.placeholder_image);
                self.storage
                    .match_in(&self.bucket(BucketKind::Static), &placeholder)
                    .map(CachedResponse::into_response)
                    .unwrap_or_else(offline::unavailable)
            }
            Fallback::Unavailable => offline::unavailable(),
        }
    }

    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, CacheError> {
        self.network
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| CacheError::NetworkUnavailable(e.to_string()))
    }

    async fn fetch(&self, url: &str) -> Result<Response<Bytes>, CacheError> {
        let request = Request::get(url)
            .body(Bytes::new())
            .map_err(|e| CacheError::NetworkUnavailable(e.to_string()))?;
        self.send(request).await
    }
}

impl<S> Service<Request<Bytes>> for ResourceCache<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = BoxError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Bytes>, BoxError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { this.handle(request).await })
    }
}
