//! Test doubles shared by the integration specs.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{Request, Response, StatusCode};
use tower::{BoxError, Service};

use portfolio_showcase::error::FullscreenError;
use portfolio_showcase::loader::{
    ContentAccess, Document, EventHub, Surface, SurfaceEvent, SurfaceFactory,
};
use portfolio_showcase::models::{ProjectDescriptor, ProjectInput};
use portfolio_showcase::overlay::NavBar;
use portfolio_showcase::presenter::{FocusTarget, Stage};
use portfolio_showcase::registry::Registry;
use portfolio_showcase::transition::{BreadcrumbSink, BreadcrumbView, Navigator, TransitionOverlay};

pub const ORIGIN: &str = "http://site.test";

pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

/// Registry with the two demos used across the end-to-end specs.
pub fn two_project_registry() -> Registry {
    Registry::from_inputs(
        ["acai-dany", "barbearia-raimundos"]
            .iter()
            .map(|key| ProjectInput {
                key: key.to_string(),
                name: key.to_string(),
                description: String::new(),
                source_path: None,
                demo_path: None,
                entry_point: None,
                technologies: vec![],
            })
            .collect(),
    )
    .expect("valid registry")
}

// ============================================================
// Network
// ============================================================

#[derive(Default)]
struct NetworkInner {
    offline: bool,
    routes: HashMap<String, (StatusCode, Bytes)>,
    calls: Vec<String>,
}

/// Scripted network: URLs map to fixed responses, unknown URLs are 404.
#[derive(Clone, Default)]
pub struct FakeNetwork {
    inner: Arc<Mutex<NetworkInner>>,
}

impl FakeNetwork {
    pub fn serve(&self, url: &str, body: &'static str) -> &Self {
        self.serve_status(url, StatusCode::OK, body)
    }

    pub fn serve_status(&self, url: &str, status: StatusCode, body: &'static str) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert(url.to_string(), (status, Bytes::from_static(body.as_bytes())));
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn respond(&self, request: Request<Bytes>) -> Result<Response<Bytes>, BoxError> {
        let mut inner = self.inner.lock().unwrap();
        let url = request.uri().to_string();
        inner.calls.push(format!("{} {}", request.method(), url));
        if inner.offline {
            return Err("network unreachable".into());
        }
        let (status, body) = inner
            .routes
            .get(&url)
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, Bytes::from_static(b"not found")));
        let mut response = Response::new(body);
        *response.status_mut() = status;
        Ok(response)
    }
}

impl Service<Request<Bytes>> for FakeNetwork {
    type Response = Response<Bytes>;
    type Error = BoxError;
    type Future = Ready<Result<Response<Bytes>, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        ready(self.respond(request))
    }
}

// ============================================================
// Surface
// ============================================================

#[derive(Default)]
pub struct FakeDocument {
    body: Mutex<String>,
    padding_top: Mutex<Option<u32>>,
    bars: Mutex<Vec<NavBar>>,
}

impl FakeDocument {
    pub fn with_body(body: &str) -> Self {
        Self {
            body: Mutex::new(body.to_string()),
            ..Default::default()
        }
    }

    pub fn padding_top(&self) -> Option<u32> {
        *self.padding_top.lock().unwrap()
    }

    pub fn bars(&self) -> Vec<NavBar> {
        self.bars.lock().unwrap().clone()
    }
}

impl Document for FakeDocument {
    fn body_html(&self) -> String {
        self.body.lock().unwrap().clone()
    }

    fn has_element(&self, id: &str) -> bool {
        self.bars.lock().unwrap().iter().any(|bar| bar.id == id)
    }

    fn set_body_padding_top(&self, px: u32) {
        *self.padding_top.lock().unwrap() = Some(px);
    }

    fn prepend_to_body(&self, bar: NavBar) {
        self.bars.lock().unwrap().insert(0, bar);
    }
}

#[derive(Clone)]
pub enum Access {
    SameOrigin(Arc<FakeDocument>),
    CrossOrigin,
    NoWindow,
}

/// Surface whose signals are scripted per navigation. Without a script
/// entry a navigation stays silent, which the loader sees as a timeout.
pub struct FakeSurface {
    events: EventHub,
    access: Mutex<Access>,
    script: Mutex<VecDeque<Option<SurfaceEvent>>>,
    default_signal: Mutex<Option<SurfaceEvent>>,
    navigations: Mutex<Vec<String>>,
    clears: AtomicUsize,
}

impl FakeSurface {
    pub fn new(access: Access) -> Self {
        Self {
            events: EventHub::default(),
            access: Mutex::new(access),
            script: Mutex::default(),
            default_signal: Mutex::new(None),
            navigations: Mutex::default(),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn cross_origin() -> Self {
        Self::new(Access::CrossOrigin)
    }

    pub fn same_origin(body: &str) -> (Self, Arc<FakeDocument>) {
        let document = Arc::new(FakeDocument::with_body(body));
        (Self::new(Access::SameOrigin(document.clone())), document)
    }

    /// Signal sent on every navigation not covered by the script.
    pub fn always(self, signal: SurfaceEvent) -> Self {
        *self.default_signal.lock().unwrap() = Some(signal);
        self
    }

    pub fn then(self, signal: Option<SurfaceEvent>) -> Self {
        self.script.lock().unwrap().push_back(signal);
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// Yield until the loader has registered its listener.
    pub async fn listening(&self) {
        while self.events.listener_count() == 0 {
            tokio::task::yield_now().await;
        }
    }
}

impl Surface for FakeSurface {
    fn navigate(&self, url: &str) {
        self.navigations.lock().unwrap().push(url.to_string());
        let scripted = self.script.lock().unwrap().pop_front();
        let signal = match scripted {
            Some(signal) => signal,
            None => self.default_signal.lock().unwrap().clone(),
        };
        if let Some(signal) = signal {
            self.events.emit(signal);
        }
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }

    fn events(&self) -> &EventHub {
        &self.events
    }

    fn content(&self) -> ContentAccess {
        match &*self.access.lock().unwrap() {
            Access::SameOrigin(document) => ContentAccess::Accessible(document.clone()),
            Access::CrossOrigin => ContentAccess::Blocked,
            Access::NoWindow => ContentAccess::Absent,
        }
    }
}

/// Hands out cross-origin surfaces and remembers what it created.
#[derive(Default)]
pub struct FakeFactory {
    pub created: Mutex<Vec<Arc<FakeSurface>>>,
    pub removed: AtomicUsize,
}

impl SurfaceFactory for FakeFactory {
    fn create_hidden(&self) -> Arc<dyn Surface> {
        let surface = Arc::new(FakeSurface::cross_origin());
        self.created.lock().unwrap().push(surface.clone());
        surface
    }

    fn remove(&self, _surface: &Arc<dyn Surface>) {
        self.removed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================
// Stage and transition collaborators
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    ShowModal(String),
    HideModal,
    Loading(String),
    Loaded(String),
    Error(String, String),
    Menu(bool),
    Focus(FocusTarget),
    EnterFullscreen,
    ExitFullscreen,
}

#[derive(Default)]
pub struct RecordingStage {
    events: Mutex<Vec<StageEvent>>,
    deny_fullscreen: Mutex<Option<FullscreenError>>,
}

impl RecordingStage {
    pub fn denying_fullscreen(error: FullscreenError) -> Self {
        Self {
            deny_fullscreen: Mutex::new(Some(error)),
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn last_focus(&self) -> Option<FocusTarget> {
        self.events().into_iter().rev().find_map(|e| match e {
            StageEvent::Focus(target) => Some(target),
            _ => None,
        })
    }

    fn record(&self, event: StageEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Stage for RecordingStage {
    fn show_modal(&self, project: &ProjectDescriptor) {
        self.record(StageEvent::ShowModal(project.key.clone()));
    }

    fn hide_modal(&self) {
        self.record(StageEvent::HideModal);
    }

    fn render_loading(&self, project: &ProjectDescriptor) {
        self.record(StageEvent::Loading(project.key.clone()));
    }

    fn render_loaded(&self, project: &ProjectDescriptor) {
        self.record(StageEvent::Loaded(project.key.clone()));
    }

    fn render_error(&self, project: &ProjectDescriptor, message: &str) {
        self.record(StageEvent::Error(project.key.clone(), message.to_string()));
    }

    fn render_menu(&self, open: bool) {
        self.record(StageEvent::Menu(open));
    }

    fn focus(&self, target: &FocusTarget) {
        self.record(StageEvent::Focus(target.clone()));
    }

    async fn request_fullscreen(&self) -> Result<(), FullscreenError> {
        let denied = self.deny_fullscreen.lock().unwrap().clone();
        match denied {
            Some(error) => Err(error),
            None => {
                self.record(StageEvent::EnterFullscreen);
                Ok(())
            }
        }
    }

    fn exit_fullscreen(&self) {
        self.record(StageEvent::ExitFullscreen);
    }
}

#[derive(Default)]
pub struct RecordingOverlay {
    pub shown: Mutex<Vec<String>>,
    pub visible: Mutex<bool>,
}

impl RecordingOverlay {
    pub fn last_message(&self) -> Option<String> {
        self.shown.lock().unwrap().last().cloned()
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.lock().unwrap()
    }
}

impl TransitionOverlay for RecordingOverlay {
    fn show(&self, message: &str) {
        self.shown.lock().unwrap().push(message.to_string());
        *self.visible.lock().unwrap() = true;
    }

    fn hide(&self) {
        *self.visible.lock().unwrap() = false;
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visited.lock().unwrap().push(url.to_string());
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub views: Mutex<Vec<BreadcrumbView>>,
}

impl BreadcrumbSink for RecordingSink {
    fn render(&self, view: &BreadcrumbView) {
        self.views.lock().unwrap().push(view.clone());
    }
}
