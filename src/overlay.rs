//! "Back to portfolio" bar injected into same-origin demo documents.
//!
//! Injection is an enhancement: when the document cannot be reached it is
//! skipped quietly, and nothing here ever returns an error.

use std::fmt;
use std::sync::Arc;

use crate::loader::{ContentAccess, Surface};

pub const NAV_BAR_ID: &str = "portfolio-nav-bar";
pub const NAV_BAR_HEIGHT_PX: u32 = 50;

/// Called when the bar's back control is activated.
pub type BackAction = Arc<dyn Fn() + Send + Sync>;

/// The injected navigation bar.
#[derive(Clone)]
pub struct NavBar {
    pub id: &'static str,
    pub height_px: u32,
    pub title: String,
    on_back: BackAction,
}

impl NavBar {
    /// Activate the back control. This runs the portfolio's close action;
    /// the document itself never navigates.
    pub fn back(&self) {
        (self.on_back)();
    }

    pub fn html(&self) -> String {
        format!(
            concat!(
                r#"<nav id="{id}" style="position:fixed;top:0;left:0;right:0;height:{h}px;"#,
                r#"display:flex;align-items:center;gap:1rem;padding:0 1rem;"#,
                r#"background:#1f1f2e;color:#fff;z-index:2147483647;font-family:system-ui,sans-serif">"#,
                r#"<button type="button" data-action="close-presentation">&larr; Portfolio</button>"#,
                r#"<span>{title}</span></nav>"#
            ),
            id = self.id,
            h = self.height_px,
            title = escape_html(&self.title),
        )
    }
}

impl fmt::Debug for NavBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavBar")
            .field("id", &self.id)
            .field("height_px", &self.height_px)
            .field("title", &self.title)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    Injected,
    AlreadyPresent,
    Skipped,
}

#[derive(Clone)]
pub struct OverlayInjector {
    on_back: BackAction,
}

impl OverlayInjector {
    pub fn new(on_back: BackAction) -> Self {
        Self { on_back }
    }

    /// Insert the bar as the first child of the surface's body, padding the
    /// body so content stays visible. Does nothing if the bar is present.
    pub fn inject(&self, surface: &dyn Surface, title: &str) -> InjectOutcome {
        let document = match surface.content() {
            ContentAccess::Accessible(document) => document,
            ContentAccess::Blocked => {
                tracing::debug!("Demo document is cross-origin, skipping navigation bar");
                return InjectOutcome::Skipped;
            }
            ContentAccess::Absent => {
                tracing::debug!("No demo document to inject into");
                return InjectOutcome::Skipped;
            }
        };

        if document.has_element(NAV_BAR_ID) {
            return InjectOutcome::AlreadyPresent;
        }

        document.set_body_padding_top(NAV_BAR_HEIGHT_PX);
        document.prepend_to_body(NavBar {
            id: NAV_BAR_ID,
            height_px: NAV_BAR_HEIGHT_PX,
            title: title.to_string(),
            on_back: self.on_back.clone(),
        });
        InjectOutcome::Injected
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
