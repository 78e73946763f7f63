mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use portfolio_showcase::config::SiteConfig;
use portfolio_showcase::loader::{DemoLoader, RetryPolicy};
use portfolio_showcase::models::Phase;
use portfolio_showcase::presenter::{Presenter, PresenterOptions};
use portfolio_showcase::transition::{Destination, TransitionCoordinator};

struct Harness {
    coordinator: TransitionCoordinator,
    presenter: Presenter,
    overlay: Arc<RecordingOverlay>,
    navigator: Arc<RecordingNavigator>,
    sink: Arc<RecordingSink>,
}

fn harness() -> Harness {
    let presenter = Presenter::new(
        DemoLoader::new(two_project_registry(), RetryPolicy::default()),
        Arc::new(FakeSurface::cross_origin()),
        Arc::new(RecordingStage::default()),
        PresenterOptions::default(),
    );
    let overlay = Arc::new(RecordingOverlay::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let sink = Arc::new(RecordingSink::default());
    let coordinator = TransitionCoordinator::new(
        presenter.clone(),
        overlay.clone(),
        navigator.clone(),
        sink.clone(),
        SiteConfig::default().transition.duration(),
    );
    Harness {
        coordinator,
        presenter,
        overlay,
        navigator,
        sink,
    }
}

mod single_flight {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_request_is_ignored_while_running() {
        let h = harness();

        let first = h.coordinator.navigate_with_transition("/sobre.html", "A");
        let second = h.coordinator.navigate_with_transition("/contato.html", "B");

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(h.overlay.last_message().as_deref(), Some("A"));

        first.unwrap().await.unwrap();
        assert_eq!(
            *h.navigator.visited.lock().unwrap(),
            vec!["/sobre.html".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn page_navigation_keeps_overlay_until_loaded() {
        let h = harness();

        h.coordinator
            .navigate_with_transition("/sobre.html", "Carregando")
            .unwrap()
            .await
            .unwrap();
        assert!(h.overlay.is_visible());
        assert!(h.presenter.state().is_transitioning);

        h.coordinator.on_page_loaded();
        assert!(!h.overlay.is_visible());
        assert!(!h.presenter.state().is_transitioning);
        assert!(h
            .coordinator
            .navigate_with_transition("/contato.html", "Again")
            .is_some());
    }
}

mod destinations {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn demo_urls_open_in_the_modal_after_the_delay() {
        let h = harness();
        let start = tokio::time::Instant::now();

        let task = h
            .coordinator
            .navigate_with_transition("/demos/acai-dany/index.html", "Abrindo")
            .unwrap();
        tokio::time::sleep(Duration::from_millis(399)).await;
        assert!(!h.presenter.state().is_open());

        task.await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(400));
        let state = h.presenter.state();
        assert_eq!(state.phase, Phase::Open);
        assert_eq!(state.current_project_key.as_deref(), Some("acai-dany"));
        assert!(!state.is_transitioning);
        assert!(!h.overlay.is_visible());
        assert!(h.navigator.visited.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn portfolio_root_closes_the_modal() {
        let h = harness();
        h.presenter.open_demo("acai-dany", None).unwrap();

        h.coordinator
            .transition_to(Destination::Portfolio, "Voltando")
            .unwrap()
            .await
            .unwrap();

        assert!(!h.presenter.state().is_open());
        assert!(!h.overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn menu_is_closed_when_a_transition_starts() {
        let h = harness();
        h.presenter.open_demo("acai-dany", None).unwrap();
        h.presenter.toggle_menu();

        let task = h
            .coordinator
            .navigate_with_transition("/demos/barbearia-raimundos/", "Trocando")
            .unwrap();
        assert!(!h.presenter.state().is_menu_open);

        task.await.unwrap();
        assert_eq!(
            h.presenter.state().current_project_key.as_deref(),
            Some("barbearia-raimundos")
        );
    }
}

mod breadcrumbs {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn follow_the_open_project() {
        let h = harness();
        let tracker = h.coordinator.track_breadcrumbs();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(h.coordinator.breadcrumbs().current.is_none());

        h.presenter.open_demo("barbearia-raimundos", None).unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;

        let view = h.coordinator.breadcrumbs();
        assert_eq!(view.current.as_deref(), Some("barbearia-raimundos"));
        assert_eq!(view.trail.len(), 2);
        assert_eq!(view.menu.iter().filter(|e| e.active).count(), 1);

        h.presenter.close_demo();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(h.coordinator.breadcrumbs().current.is_none());

        let rendered = h.sink.views.lock().unwrap().len();
        assert_eq!(rendered, 3);
        tracker.abort();
    }
}
