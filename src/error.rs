//! Error taxonomy shared by the loader, cache layer and presenter.

use thiserror::Error;

/// Failures of a demo load. Only the final one, after retries are spent,
/// reaches the presenter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Project not found: {0}")]
    ConfigNotFound(String),

    #[error("Timeout loading {key} after {attempts} attempts")]
    LoadTimeout { key: String, attempts: u32 },

    #[error("Failed to load {key} after {attempts} attempts: {reason}")]
    LoadFailed {
        key: String,
        attempts: u32,
        reason: String,
    },

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// A newer load on the same loader took over before this one settled.
    #[error("Load of {0} was superseded by a newer load")]
    Superseded(String),
}

/// Failures inside the resource cache layer. These never reach the page:
/// the layer recovers locally and still produces a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Storage quota exceeded writing {url} ({needed} bytes, {available} available)")]
    StorageQuotaExceeded {
        url: String,
        needed: usize,
        available: usize,
    },

    #[error("Install failed: {0}")]
    InstallFailed(String),
}

/// The platform refused or does not support fullscreen.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FullscreenError {
    #[error("Fullscreen is not supported")]
    Unsupported,

    #[error("Fullscreen request denied: {0}")]
    Denied(String),

    #[error("Presentation is not open")]
    NotOpen,
}

/// Problems building the project registry from configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate project key: {0}")]
    DuplicateKey(String),

    #[error("Project key must not be empty")]
    EmptyKey,
}
