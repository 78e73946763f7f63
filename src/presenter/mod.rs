//! Modal and menu state machine.
//!
//! [`Presenter`] is the only writer of [`PresentationState`]. It opens
//! demos through the [`DemoLoader`], drives the [`Stage`] to match the
//! state, and publishes every change on a `watch` channel for readers.
//!
//! Every `open_demo` starts a new load generation. A load that settles
//! for an older generation is discarded, so a quick switch from one demo
//! to another can never be undone by the first load finishing late.

mod focus;
mod keys;
mod stage;

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use focus::{FocusTarget, FocusTrap, ModalControl};
pub use keys::{browse_target, Key};
pub use stage::Stage;

use crate::config::SiteConfig;
use crate::error::{FullscreenError, LoadError};
use crate::loader::{DemoLoader, Surface};
use crate::models::{LoadingState, Phase, PresentationState, ProjectDescriptor};
use crate::overlay::{InjectOutcome, OverlayInjector};

#[derive(Debug, Clone)]
pub struct PresenterOptions {
    /// Arrow/Home/End switch between demos while open.
    pub browse_keys: bool,
}

impl PresenterOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            browse_keys: config.browse_keys,
        }
    }
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self { browse_keys: true }
    }
}

#[derive(Clone)]
pub struct Presenter {
    inner: Arc<Inner>,
}

struct Inner {
    loader: DemoLoader,
    surface: Arc<dyn Surface>,
    stage: Arc<dyn Stage>,
    injector: OverlayInjector,
    options: PresenterOptions,
    machine: Mutex<Machine>,
    state_tx: watch::Sender<PresentationState>,
}

#[derive(Default)]
struct Machine {
    state: PresentationState,
    generation: u64,
    load_task: Option<JoinHandle<()>>,
    /// Element that opened the modal; focus returns there on close.
    invoker: Option<String>,
    focus: FocusTrap,
}

impl Machine {
    fn cancel_load(&mut self) {
        self.generation += 1;
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
    }
}

impl Presenter {
    pub fn new(
        loader: DemoLoader,
        surface: Arc<dyn Surface>,
        stage: Arc<dyn Stage>,
        options: PresenterOptions,
    ) -> Self {
        let (state_tx, _) = watch::channel(PresentationState::default());
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let injector = OverlayInjector::new(Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Presenter { inner }.close_demo();
                }
            }));
            Inner {
                loader,
                surface,
                stage,
                injector,
                options,
                machine: Mutex::new(Machine::default()),
                state_tx,
            }
        });
        Self { inner }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PresentationState {
        self.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.inner.state_tx.subscribe()
    }

    pub fn loader(&self) -> &DemoLoader {
        &self.inner.loader
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Machine> {
        self.inner.machine.lock().expect("presenter lock poisoned")
    }

    fn publish(&self, machine: &Machine) {
        debug_assert!(machine.state.invariants_hold());
        self.inner.state_tx.send_replace(machine.state.clone());
    }

    // ============================================================
    // Opening and closing
    // ============================================================

    /// Show `key` in the modal, from closed or while another demo is open.
    ///
    /// The modal opens right away with a loading indicator; the load result
    /// arrives later. `invoker` is remembered only when opening from closed.
    pub fn open_demo(&self, key: &str, invoker: Option<&str>) -> Result<(), LoadError> {
        let project = self
            .inner
            .loader
            .registry()
            .get(key)
            .cloned()
            .ok_or_else(|| LoadError::ConfigNotFound(key.to_string()))?;

        let mut machine = self.lock();
        machine.cancel_load();
        let generation = machine.generation;
        let was_open = machine.state.is_open();

        if was_open {
            self.inner.surface.clear();
        } else {
            machine.invoker = invoker.map(str::to_string);
        }

        machine.state.current_project_key = Some(project.key.clone());
        machine.state.phase = Phase::Opening;
        machine.state.loading_state = LoadingState::Loading;
        machine.state.last_error = None;
        machine.state.is_menu_open = false;
        if !was_open {
            self.inner.stage.show_modal(&project);
        }
        machine.state.phase = Phase::Open;
        self.inner.stage.render_loading(&project);
        self.inner.stage.render_menu(false);

        machine.focus = FocusTrap::new(None);
        let target = FocusTarget::Control(ModalControl::Close);
        machine.focus.focus(&target);
        self.inner.stage.focus(&target);

        let this = self.clone();
        let key = project.key.clone();
        machine.load_task = Some(tokio::spawn(async move {
            let surface = this.inner.surface.clone();
            let result = this.inner.loader.load(&key, surface.as_ref()).await;
            this.settle(generation, result);
        }));

        tracing::debug!("Opening {} (generation {})", project.key, generation);
        self.publish(&machine);
        Ok(())
    }

    /// Re-open the current demo after a failed load.
    pub fn retry(&self) -> Result<(), LoadError> {
        let key = self.lock().state.current_project_key.clone();
        match key {
            Some(key) => self.open_demo(&key, None),
            None => Ok(()),
        }
    }

    fn settle(&self, generation: u64, result: Result<ProjectDescriptor, LoadError>) {
        let mut machine = self.lock();
        if machine.generation != generation || !machine.state.is_open() {
            tracing::debug!("Discarding stale load result (generation {})", generation);
            return;
        }
        machine.load_task = None;

        let loaded = match result {
            Ok(project) => {
                machine.state.loading_state = LoadingState::Loaded;
                self.inner.stage.render_loaded(&project);
                Some(project)
            }
            Err(e) => {
                tracing::warn!("Demo failed to load: {}", e);
                let message = e.to_string();
                if let Some(project) = machine
                    .state
                    .current_project_key
                    .as_deref()
                    .and_then(|key| self.inner.loader.registry().get(key))
                {
                    self.inner.stage.render_error(project, &message);
                }
                machine.state.loading_state = LoadingState::Error;
                machine.state.last_error = Some(message);
                None
            }
        };
        self.publish(&machine);
        drop(machine);

        if let Some(project) = loaded {
            if self
                .inner
                .injector
                .inject(self.inner.surface.as_ref(), &project.name)
                == InjectOutcome::Injected
            {
                tracing::debug!("Injected navigation bar into {}", project.key);
            }
        }
    }

    /// Tear the modal down and return focus to whatever opened it.
    /// Returns false when nothing was open.
    pub fn close_demo(&self) -> bool {
        let mut machine = self.lock();
        if !machine.state.is_open() {
            return false;
        }

        machine.cancel_load();
        if machine.state.is_fullscreen {
            self.inner.stage.exit_fullscreen();
        }
        self.inner.surface.clear();
        if machine.state.is_menu_open {
            self.inner.stage.render_menu(false);
        }
        self.inner.stage.hide_modal();
        machine.state.reset();
        machine.focus = FocusTrap::default();

        if let Some(invoker) = machine.invoker.take() {
            self.inner.stage.focus(&FocusTarget::Element(invoker));
        }
        self.publish(&machine);
        true
    }

    /// Warm the cache for a demo the user is likely to open next.
    pub fn preload(&self, key: &str) {
        self.inner.loader.preload(key);
    }

    // ============================================================
    // Fullscreen
    // ============================================================

    /// Enter or leave fullscreen. A refused request leaves the state as it
    /// was and is returned to the caller. Returns the new fullscreen flag.
    pub async fn toggle_fullscreen(&self) -> Result<bool, FullscreenError> {
        let generation = {
            let mut machine = self.lock();
            if !machine.state.is_open() {
                return Err(FullscreenError::NotOpen);
            }
            if machine.state.is_fullscreen {
                self.inner.stage.exit_fullscreen();
                machine.state.is_fullscreen = false;
                self.publish(&machine);
                return Ok(false);
            }
            machine.generation
        };

        if let Err(e) = self.inner.stage.request_fullscreen().await {
            tracing::warn!("Fullscreen unavailable: {}", e);
            return Err(e);
        }

        let mut machine = self.lock();
        if machine.generation != generation || !machine.state.is_open() {
            // Closed or switched while the platform was deciding.
            self.inner.stage.exit_fullscreen();
            return Ok(false);
        }
        machine.state.is_fullscreen = true;
        self.publish(&machine);
        Ok(true)
    }

    /// The platform left fullscreen on its own (e.g. the browser's Esc).
    pub fn fullscreen_exited(&self) {
        let mut machine = self.lock();
        if machine.state.is_fullscreen {
            machine.state.is_fullscreen = false;
            self.publish(&machine);
        }
    }

    // ============================================================
    // Menu
    // ============================================================

    pub fn toggle_menu(&self) -> bool {
        let open = !self.lock().state.is_menu_open;
        if open {
            self.open_menu()
        } else {
            self.close_menu()
        }
    }

    /// Open the demo-switch menu and focus its first entry. Refused while
    /// closed or during a transition.
    pub fn open_menu(&self) -> bool {
        let mut machine = self.lock();
        if !machine.state.is_open() || machine.state.is_transitioning || machine.state.is_menu_open {
            return false;
        }
        machine.state.is_menu_open = true;
        machine.focus = FocusTrap::new(Some(self.inner.loader.registry().len()));
        let first = FocusTarget::MenuItem(0);
        machine.focus.focus(&first);
        self.inner.stage.render_menu(true);
        self.inner.stage.focus(&first);
        self.publish(&machine);
        true
    }

    pub fn close_menu(&self) -> bool {
        let mut machine = self.lock();
        if !machine.state.is_menu_open {
            return false;
        }
        self.close_menu_locked(&mut machine);
        self.publish(&machine);
        true
    }

    fn close_menu_locked(&self, machine: &mut Machine) {
        machine.state.is_menu_open = false;
        machine.focus = FocusTrap::new(None);
        let target = FocusTarget::Control(ModalControl::Menu);
        machine.focus.focus(&target);
        self.inner.stage.render_menu(false);
        self.inner.stage.focus(&target);
    }

    // ============================================================
    // Keyboard
    // ============================================================

    /// Keyboard contract while the modal is open. Returns whether the key
    /// was consumed.
    pub fn handle_key(&self, key: Key) -> bool {
        let (menu_open, current) = {
            let machine = self.lock();
            if !machine.state.is_open() {
                return false;
            }
            (
                machine.state.is_menu_open,
                machine.state.current_project_key.clone(),
            )
        };

        match key {
            Key::Escape if menu_open => self.close_menu(),
            Key::Escape => self.close_demo(),
            Key::Tab | Key::ShiftTab => {
                let mut machine = self.lock();
                let next = machine.focus.advance(key == Key::ShiftTab).cloned();
                if let Some(target) = next {
                    self.inner.stage.focus(&target);
                }
                true
            }
            Key::ArrowLeft | Key::ArrowRight | Key::Home | Key::End => {
                if !self.inner.options.browse_keys || menu_open {
                    return false;
                }
                let registry = self.inner.loader.registry();
                let target = current
                    .as_deref()
                    .and_then(|key| registry.position(key))
                    .and_then(|position| browse_target(key, position, registry.len()))
                    .and_then(|position| registry.at(position))
                    .map(|project| project.key.clone());
                match target {
                    Some(next) => self.open_demo(&next, None).is_ok(),
                    None => false,
                }
            }
            Key::Other => false,
        }
    }

    // ============================================================
    // Transitions
    // ============================================================

    /// Mark a transition as running, closing the menu first. False when one
    /// is already in progress.
    pub fn begin_transition(&self) -> bool {
        let mut machine = self.lock();
        if machine.state.is_transitioning {
            return false;
        }
        if machine.state.is_menu_open {
            self.close_menu_locked(&mut machine);
        }
        machine.state.is_transitioning = true;
        self.publish(&machine);
        true
    }

    pub fn end_transition(&self) {
        let mut machine = self.lock();
        if machine.state.is_transitioning {
            machine.state.is_transitioning = false;
            self.publish(&machine);
        }
    }
}
