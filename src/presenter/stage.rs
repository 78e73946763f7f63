use async_trait::async_trait;

use super::focus::FocusTarget;
use crate::error::FullscreenError;
use crate::models::ProjectDescriptor;

/// The portfolio page around the presentation surface.
///
/// Implementations must not call back into the presenter synchronously;
/// user actions (retry, close, key presses) arrive as separate calls.
#[async_trait]
pub trait Stage: Send + Sync {
    fn show_modal(&self, project: &ProjectDescriptor);
    fn hide_modal(&self);
    fn render_loading(&self, project: &ProjectDescriptor);
    fn render_loaded(&self, project: &ProjectDescriptor);
    /// Inline error with a retry control wired to `Presenter::retry`.
    fn render_error(&self, project: &ProjectDescriptor, message: &str);
    fn render_menu(&self, open: bool);
    fn focus(&self, target: &FocusTarget);
    /// Ask the platform to make the presentation container fullscreen.
    async fn request_fullscreen(&self) -> Result<(), FullscreenError>;
    fn exit_fullscreen(&self);
}
