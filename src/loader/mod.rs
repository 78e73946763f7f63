//! Demo load controller.
//!
//! [`DemoLoader::load`] points a [`Surface`] at a demo's entry document and
//! resolves once the surface reports a load that passes [`verify`]. Each
//! attempt races the surface's first signal against a timeout; failures
//! are retried per [`RetryPolicy`] and only the final one is returned.

mod attempt;
mod retry;
mod status;
mod surface;
mod verify;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

pub use attempt::{AttemptOutcome, LoadAttempt};
pub use retry::{FailureKind, RetryPolicy};
pub use status::{Availability, DemoStatus, FsProbe, HttpProbe, StatusProbe};
pub use surface::{
    ContentAccess, Document, EventHub, Subscription, Surface, SurfaceEvent, SurfaceFactory,
};
pub use verify::verify;

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::models::ProjectDescriptor;
use crate::registry::Registry;

#[derive(Clone)]
pub struct DemoLoader {
    registry: Registry,
    policy: RetryPolicy,
    preload_ttl: Duration,
    factory: Option<Arc<dyn SurfaceFactory>>,
    sequence: Arc<AtomicU64>,
}

impl DemoLoader {
    pub fn new(registry: Registry, policy: RetryPolicy) -> Self {
        Self {
            registry,
            policy,
            preload_ttl: Duration::from_millis(LoaderConfig::default().preload_ttl_ms),
            factory: None,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(registry: Registry, config: &LoaderConfig) -> Self {
        Self::new(registry, RetryPolicy::from_config(config))
            .with_preload_ttl(Duration::from_millis(config.preload_ttl_ms))
    }

    /// Surfaces for [`preload`](Self::preload); without one preloading is off.
    pub fn with_surface_factory(mut self, factory: Arc<dyn SurfaceFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_preload_ttl(mut self, ttl: Duration) -> Self {
        self.preload_ttl = ttl;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Load `key` into `surface`, retrying timeouts and load errors.
    ///
    /// Unknown keys fail at once. Once retries are spent the error reports
    /// how many retries ran. Starting another load on this loader
    /// supersedes this one: it returns [`LoadError::Superseded`] at its next
    /// checkpoint, leaving the surface to the newer load.
    pub async fn load(&self, key: &str, surface: &dyn Surface) -> Result<ProjectDescriptor, LoadError> {
        let project = self
            .registry
            .get(key)
            .cloned()
            .ok_or_else(|| LoadError::ConfigNotFound(key.to_string()))?;

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut attempt = LoadAttempt::new(key, sequence);
        tracing::debug!("Loading {} (load #{})", key, sequence);

        loop {
            let outcome = attempt.run(&project, surface, self.policy.timeout).await;
            self.ensure_current(&attempt)?;
            let (kind, reason) = match outcome {
                AttemptOutcome::Loaded => {
                    tracing::info!(
                        "Loaded {} after {} retries in {:?}",
                        key,
                        attempt.retry_count,
                        attempt.started_at.elapsed()
                    );
                    return Ok(project);
                }
                AttemptOutcome::TimedOut => (FailureKind::Timeout, None),
                AttemptOutcome::Errored(reason) => (FailureKind::Error, Some(reason)),
            };

            let Some(delay) = self.policy.next_delay(kind, attempt.retry_count) else {
                let attempts = attempt.retry_count;
                return Err(match reason {
                    None => LoadError::LoadTimeout {
                        key: key.to_string(),
                        attempts,
                    },
                    Some(reason) => LoadError::LoadFailed {
                        key: key.to_string(),
                        attempts,
                        reason,
                    },
                });
            };

            attempt.retry_count += 1;
            tracing::warn!(
                "Load of {} failed ({:?}{}), retry {}/{} in {:?}",
                key,
                kind,
                reason.map(|r| format!(": {}", r)).unwrap_or_default(),
                attempt.retry_count,
                self.policy.max_retries,
                delay
            );
            surface.clear();
            tokio::time::sleep(delay).await;
            self.ensure_current(&attempt)?;
        }
    }

    /// A newer `load` owns the surface now; this one must not touch it.
    fn ensure_current(&self, attempt: &LoadAttempt) -> Result<(), LoadError> {
        if self.sequence.load(Ordering::SeqCst) == attempt.sequence {
            return Ok(());
        }
        tracing::debug!(
            "Load #{} of {} superseded, discarding its result",
            attempt.sequence,
            attempt.project_key
        );
        Err(LoadError::Superseded(attempt.project_key.clone()))
    }

    /// Warm the cache for `key` with a hidden surface that is removed after
    /// a fixed delay, loaded or not. Never fails; returns the cleanup task
    /// when a preload actually started.
    pub fn preload(&self, key: &str) -> Option<JoinHandle<()>> {
        let Some(project) = self.registry.get(key) else {
            tracing::debug!("Not preloading unknown project {}", key);
            return None;
        };
        let factory = self.factory.clone()?;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime available, skipping preload of {}", key);
            return None;
        };

        let surface = factory.create_hidden();
        surface.navigate(&project.entry_url());
        let ttl = self.preload_ttl;
        Some(runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            surface.clear();
            factory.remove(&surface);
        }))
    }

    /// Probe the demo's entry document. Unknown keys report unavailable.
    pub async fn get_status(&self, key: &str, probe: &dyn StatusProbe) -> DemoStatus {
        let project = self.registry.get(key).cloned();
        let available = match &project {
            Some(project) => probe.exists(&project.site_path()).await,
            None => false,
        };
        DemoStatus {
            status: if available {
                Availability::Available
            } else {
                Availability::Unavailable
            },
            project,
            last_checked: Utc::now(),
        }
    }
}
