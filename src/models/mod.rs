//! Domain models for the showcase.
//!
//! - [`ProjectDescriptor`]: immutable metadata of one showcased demo, looked
//!   up by key through the [`Registry`](crate::registry::Registry).
//! - [`PresentationState`]: the single mutable UI state, owned by the
//!   [`Presenter`](crate::presenter::Presenter).

mod project;
mod state;

pub use project::*;
pub use state::*;
