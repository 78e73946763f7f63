use axum::body::Bytes;
use axum::http::{Request, Response};
use tower::{BoxError, Layer, Service};

use super::classify::Scope;
use super::storage::CacheStorage;
use super::worker::ResourceCache;
use crate::config::CacheConfig;
use crate::registry::Registry;

/// Wraps a network service in a [`ResourceCache`].
#[derive(Clone)]
pub struct CacheLayer {
    storage: CacheStorage,
    scope: Scope,
    config: CacheConfig,
    registry: Registry,
}

impl CacheLayer {
    pub fn new(storage: CacheStorage, scope: Scope, config: CacheConfig, registry: Registry) -> Self {
        Self {
            storage,
            scope,
            config,
            registry,
        }
    }
}

impl<S> Layer<S> for CacheLayer
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = BoxError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    type Service = ResourceCache<S>;

    fn layer(&self, network: S) -> Self::Service {
        ResourceCache::new(
            network,
            self.storage.clone(),
            self.scope.clone(),
            self.config.clone(),
            &self.registry,
        )
    }
}
