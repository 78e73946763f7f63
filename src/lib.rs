//! Runtime of a portfolio site that presents demo applications in an
//! embedded viewer.
//!
//! - [`registry`]: the showcased projects.
//! - [`cache`]: offline-first resource cache in front of the network.
//! - [`loader`]: loads a demo into a presentation surface with timeouts,
//!   retries and verification.
//! - [`overlay`]: injects a "back to portfolio" bar into loaded demos.
//! - [`presenter`]: modal, menu, fullscreen and keyboard state machine.
//! - [`transition`]: single-flight navigation transitions and breadcrumbs.
//! - [`api`] / [`proxy`]: HTTP surfaces used by the `showcase` binary.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod overlay;
pub mod presenter;
pub mod proxy;
pub mod registry;
pub mod transition;
