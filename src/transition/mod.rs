//! Transition overlay and breadcrumbs.
//!
//! Navigations go through [`TransitionCoordinator::navigate_with_transition`],
//! which shows a blocking overlay for a fixed time before navigating. Only
//! one transition runs at a time; calls made meanwhile are ignored.

mod breadcrumb;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

pub use breadcrumb::{BreadcrumbView, Crumb, MenuEntry};

use crate::presenter::Presenter;
use crate::registry::Registry;

/// Full-viewport overlay shown while a transition runs.
pub trait TransitionOverlay: Send + Sync {
    fn show(&self, message: &str);
    fn hide(&self);
}

/// Full document navigation, for targets outside the single-page flow.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

pub trait BreadcrumbSink: Send + Sync {
    fn render(&self, view: &BreadcrumbView);
}

/// Where a navigation leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A registered demo, opened in the modal.
    Demo(String),
    /// Back to the portfolio itself.
    Portfolio,
    /// Any other page, loaded as a new document.
    Page(String),
}

impl Destination {
    /// Map a URL onto a demo, the portfolio root, or another page.
    pub fn resolve(url: &str, registry: &Registry) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        if path == "/" || path == "/index.html" {
            return Destination::Portfolio;
        }
        registry
            .all()
            .iter()
            .find(|p| p.site_path() == path || p.site_path().trim_end_matches("index.html") == path)
            .map(|p| Destination::Demo(p.key.clone()))
            .unwrap_or_else(|| Destination::Page(url.to_string()))
    }
}

#[derive(Clone)]
pub struct TransitionCoordinator {
    presenter: Presenter,
    overlay: Arc<dyn TransitionOverlay>,
    navigator: Arc<dyn Navigator>,
    sink: Arc<dyn BreadcrumbSink>,
    duration: Duration,
    breadcrumbs: Arc<Mutex<BreadcrumbView>>,
}

impl TransitionCoordinator {
    pub fn new(
        presenter: Presenter,
        overlay: Arc<dyn TransitionOverlay>,
        navigator: Arc<dyn Navigator>,
        sink: Arc<dyn BreadcrumbSink>,
        duration: Duration,
    ) -> Self {
        let view = BreadcrumbView::compute(
            presenter.loader().registry(),
            presenter.state().current_project_key.as_deref(),
        );
        Self {
            presenter,
            overlay,
            navigator,
            sink,
            duration,
            breadcrumbs: Arc::new(Mutex::new(view)),
        }
    }

    /// Start a transition to `url` showing `message`. Returns `None` without
    /// doing anything if a transition is already running.
    pub fn navigate_with_transition(&self, url: &str, message: &str) -> Option<JoinHandle<()>> {
        let destination = Destination::resolve(url, self.presenter.loader().registry());
        self.transition_to(destination, message)
    }

    pub fn transition_to(&self, destination: Destination, message: &str) -> Option<JoinHandle<()>> {
        if !self.presenter.begin_transition() {
            tracing::debug!("Transition already running, ignoring {:?}", destination);
            return None;
        }
        self.overlay.show(message);

        let this = self.clone();
        Some(tokio::spawn(async move {
            tokio::time::sleep(this.duration).await;
            match destination {
                Destination::Demo(key) => {
                    if let Err(e) = this.presenter.open_demo(&key, None) {
                        tracing::warn!("Transition target unavailable: {}", e);
                    }
                    this.finish();
                }
                Destination::Portfolio => {
                    this.presenter.close_demo();
                    this.finish();
                }
                Destination::Page(url) => {
                    // The overlay stays until the next page reports loaded.
                    this.navigator.navigate(&url);
                }
            }
        }))
    }

    fn finish(&self) {
        self.overlay.hide();
        self.presenter.end_transition();
    }

    /// Page load completed: hide the overlay whatever state it was left in.
    pub fn on_page_loaded(&self) {
        self.finish();
    }

    pub fn breadcrumbs(&self) -> BreadcrumbView {
        self.breadcrumbs
            .lock()
            .expect("breadcrumb lock poisoned")
            .clone()
    }

    fn refresh(&self, current_key: Option<&str>) {
        let view = BreadcrumbView::compute(self.presenter.loader().registry(), current_key);
        self.sink.render(&view);
        *self.breadcrumbs.lock().expect("breadcrumb lock poisoned") = view;
    }

    /// Follow the presenter and re-render breadcrumbs whenever the active
    /// project changes.
    pub fn track_breadcrumbs(&self) -> JoinHandle<()> {
        let this = self.clone();
        let mut rx = self.presenter.subscribe();
        tokio::spawn(async move {
            let mut current = rx.borrow_and_update().current_project_key.clone();
            this.refresh(current.as_deref());
            while rx.changed().await.is_ok() {
                let key = rx.borrow_and_update().current_project_key.clone();
                if key != current {
                    current = key;
                    this.refresh(current.as_deref());
                }
            }
        })
    }
}
