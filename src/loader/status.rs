//! Lightweight availability checks for demo entry documents.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::models::ProjectDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoStatus {
    pub status: Availability,
    pub project: Option<ProjectDescriptor>,
    pub last_checked: DateTime<Utc>,
}

/// Existence check for a site path such as `/demos/x/index.html`.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn exists(&self, site_path: &str) -> bool;
}

/// HEAD request against a deployed site.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    base_url: String,
    client: Client,
}

impl HttpProbe {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl StatusProbe for HttpProbe {
    async fn exists(&self, site_path: &str) -> bool {
        let url = format!("{}{}", self.base_url, site_path);
        match self.client.head(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Looks for the file under a site root on disk.
#[derive(Debug, Clone)]
pub struct FsProbe {
    root: PathBuf,
}

impl FsProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StatusProbe for FsProbe {
    async fn exists(&self, site_path: &str) -> bool {
        let relative = site_path.trim_start_matches('/');
        if relative.split('/').any(|part| part == "..") {
            return false;
        }
        tokio::fs::metadata(self.root.join(relative))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}
