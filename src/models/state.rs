use serde::{Deserialize, Serialize};

/// Load progress of the active demo as shown on the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Lifecycle of the presentation modal.
///
/// `Opening` only exists between an `open_demo` call and the surface being
/// shown; observers normally see `Closed` or `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Open,
}

/// Portfolio-level UI state. Owned and mutated by the presenter only.
///
/// Invariants: `is_fullscreen` implies the modal is open, and the menu is
/// never open while a transition runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresentationState {
    pub current_project_key: Option<String>,
    pub phase: Phase,
    pub is_fullscreen: bool,
    pub loading_state: LoadingState,
    pub is_menu_open: bool,
    pub is_transitioning: bool,
    /// Message of the last load failure, shown next to the retry control.
    pub last_error: Option<String>,
}

impl PresentationState {
    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    /// Back to the initial idle values. Transition tracking survives a
    /// close because a transition may be what closed the modal.
    pub fn reset(&mut self) {
        let transitioning = self.is_transitioning;
        *self = Self::default();
        self.is_transitioning = transitioning;
    }

    pub fn invariants_hold(&self) -> bool {
        (!self.is_fullscreen || self.is_open()) && !(self.is_menu_open && self.is_transitioning)
    }
}
