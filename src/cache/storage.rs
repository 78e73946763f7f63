//! In-memory cache buckets keyed by request URL.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{HeaderMap, Response, StatusCode};

use crate::error::CacheError;

/// The named buckets of one cache version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Static,
    Dynamic,
    Image,
    Offline,
}

impl BucketKind {
    pub const ALL: [BucketKind; 4] = [
        BucketKind::Static,
        BucketKind::Dynamic,
        BucketKind::Image,
        BucketKind::Offline,
    ];

    fn prefix(self) -> &'static str {
        match self {
            BucketKind::Static => "static",
            BucketKind::Dynamic => "dynamic",
            BucketKind::Image => "images",
            BucketKind::Offline => "offline",
        }
    }

    /// Version-tagged bucket name, e.g. `static-v2`.
    pub fn name(self, version: &str) -> String {
        format!("{}-{}", self.prefix(), version)
    }
}

/// A fully buffered response. Stored and returned whole, never partially.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn from_response(response: &Response<Bytes>) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }

    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    inner: Arc<Mutex<BTreeMap<String, HashMap<String, CachedResponse>>>>,
    quota: Option<usize>,
}

impl CacheStorage {
    pub fn new(quota: Option<usize>) -> Self {
        Self {
            inner: Arc::default(),
            quota,
        }
    }

    /// Create the bucket if it does not exist yet.
    pub fn open(&self, bucket: &str) {
        let mut buckets = self.inner.lock().expect("cache lock poisoned");
        buckets.entry(bucket.to_string()).or_default();
    }

    pub fn bucket_names(&self) -> Vec<String> {
        let buckets = self.inner.lock().expect("cache lock poisoned");
        buckets.keys().cloned().collect()
    }

    pub fn delete_bucket(&self, bucket: &str) -> bool {
        let mut buckets = self.inner.lock().expect("cache lock poisoned");
        buckets.remove(bucket).is_some()
    }

    /// Drop every bucket. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut buckets = self.inner.lock().expect("cache lock poisoned");
        let count = buckets.len();
        buckets.clear();
        count
    }

    pub fn match_in(&self, bucket: &str, url: &str) -> Option<CachedResponse> {
        let buckets = self.inner.lock().expect("cache lock poisoned");
        buckets.get(bucket).and_then(|b| b.get(url)).cloned()
    }

    pub fn match_any(&self, url: &str) -> Option<CachedResponse> {
        let buckets = self.inner.lock().expect("cache lock poisoned");
        buckets.values().find_map(|b| b.get(url)).cloned()
    }

    pub fn urls(&self, bucket: &str) -> Vec<String> {
        let buckets = self.inner.lock().expect("cache lock poisoned");
        let mut urls: Vec<String> = buckets
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        urls.sort();
        urls
    }

    pub fn used_bytes(&self) -> usize {
        let buckets = self.inner.lock().expect("cache lock poisoned");
        buckets
            .values()
            .flat_map(|b| b.values())
            .map(|r| r.body.len())
            .sum()
    }

    /// Store `response` under `url` in `bucket`, taking the URL away from any
    /// other bucket. Last writer wins.
    pub fn put(&self, bucket: &str, url: &str, response: CachedResponse) -> Result<(), CacheError> {
        let mut buckets = self.inner.lock().expect("cache lock poisoned");

        if let Some(quota) = self.quota {
            let used: usize = buckets
                .values()
                .flat_map(|b| b.iter())
                .filter(|(key, _)| key.as_str() != url)
                .map(|(_, r)| r.body.len())
                .sum();
            let available = quota.saturating_sub(used);
            if response.body.len() > available {
                return Err(CacheError::StorageQuotaExceeded {
                    url: url.to_string(),
                    needed: response.body.len(),
                    available,
                });
            }
        }

        for (name, entries) in buckets.iter_mut() {
            if name != bucket {
                entries.remove(url);
            }
        }
        buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(url.to_string(), response);
        Ok(())
    }
}
