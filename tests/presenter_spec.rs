mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use portfolio_showcase::config::SiteConfig;
use portfolio_showcase::error::FullscreenError;
use portfolio_showcase::loader::{DemoLoader, RetryPolicy, Surface, SurfaceEvent};
use portfolio_showcase::models::{LoadingState, Phase};
use portfolio_showcase::overlay::NAV_BAR_ID;
use portfolio_showcase::presenter::{FocusTarget, Key, ModalControl, Presenter, PresenterOptions};
use portfolio_showcase::registry::Registry;

struct Harness {
    presenter: Presenter,
    surface: Arc<FakeSurface>,
    stage: Arc<RecordingStage>,
}

fn harness_with(registry: Registry, surface: FakeSurface, stage: RecordingStage) -> Harness {
    let surface = Arc::new(surface);
    let stage = Arc::new(stage);
    let presenter = Presenter::new(
        DemoLoader::new(registry, RetryPolicy::default()),
        surface.clone(),
        stage.clone(),
        PresenterOptions::default(),
    );
    Harness {
        presenter,
        surface,
        stage,
    }
}

fn harness(surface: FakeSurface) -> Harness {
    harness_with(two_project_registry(), surface, RecordingStage::default())
}

async fn wait_until_loaded(presenter: &Presenter) {
    presenter
        .subscribe()
        .wait_for(|s| s.loading_state == LoadingState::Loaded)
        .await
        .expect("presenter alive");
}

mod open_and_close {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn loads_then_closes_and_restores_focus() {
        let h = harness(FakeSurface::cross_origin());
        assert!(!h.presenter.state().is_open());

        h.presenter.open_demo("acai-dany", Some("card-acai")).unwrap();
        let state = h.presenter.state();
        assert_eq!(state.phase, Phase::Open);
        assert_eq!(state.loading_state, LoadingState::Loading);
        assert_eq!(state.current_project_key.as_deref(), Some("acai-dany"));

        h.surface.listening().await;
        h.surface.events().emit(SurfaceEvent::Load);
        wait_until_loaded(&h.presenter).await;

        assert!(h.presenter.close_demo());
        let state = h.presenter.state();
        assert_eq!(state.phase, Phase::Closed);
        assert_eq!(state.current_project_key, None);
        assert_eq!(state.loading_state, LoadingState::Idle);
        assert_eq!(
            h.stage.last_focus(),
            Some(FocusTarget::Element("card-acai".to_string()))
        );
        assert!(h.stage.events().contains(&StageEvent::Loaded("acai-dany".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn a_newer_open_wins_over_a_stale_load() {
        let h = harness(FakeSurface::cross_origin());

        h.presenter.open_demo("acai-dany", Some("card-acai")).unwrap();
        h.presenter.open_demo("barbearia-raimundos", None).unwrap();
        h.surface.listening().await;
        h.surface.events().emit(SurfaceEvent::Load);
        wait_until_loaded(&h.presenter).await;

        // Let every timer the first load could have armed run out.
        tokio::time::sleep(Duration::from_secs(120)).await;

        let state = h.presenter.state();
        assert_eq!(
            state.current_project_key.as_deref(),
            Some("barbearia-raimundos")
        );
        assert_eq!(state.loading_state, LoadingState::Loaded);
        assert!(!h
            .stage
            .events()
            .contains(&StageEvent::Loaded("acai-dany".to_string())));

        // Focus goes back to the element that opened the first demo.
        h.presenter.close_demo();
        assert_eq!(
            h.stage.last_focus(),
            Some(FocusTarget::Element("card-acai".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_show_an_error_with_retry() {
        let h = harness(FakeSurface::cross_origin());

        h.presenter.open_demo("acai-dany", None).unwrap();
        h.presenter
            .subscribe()
            .wait_for(|s| s.loading_state == LoadingState::Error)
            .await
            .unwrap();

        let state = h.presenter.state();
        assert!(state.is_open());
        assert_eq!(
            state.last_error.as_deref(),
            Some("Timeout loading acai-dany after 3 attempts")
        );
        assert!(h.stage.events().iter().any(|e| matches!(e, StageEvent::Error(key, _) if key == "acai-dany")));

        h.presenter.retry().unwrap();
        assert_eq!(h.presenter.state().loading_state, LoadingState::Loading);
        assert_eq!(h.presenter.state().last_error, None);
    }

    #[tokio::test]
    async fn unknown_projects_are_rejected_without_opening() {
        let h = harness(FakeSurface::cross_origin());

        assert!(h.presenter.open_demo("nope", None).is_err());
        assert!(!h.presenter.state().is_open());
        assert!(h.stage.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_cancels_the_pending_load() {
        let h = harness(FakeSurface::cross_origin());

        h.presenter.open_demo("acai-dany", None).unwrap();
        h.surface.listening().await;
        assert!(h.presenter.close_demo());
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(h.surface.navigations().len(), 1);
        assert_eq!(h.surface.events().listener_count(), 0);
        assert_eq!(h.presenter.state().loading_state, LoadingState::Idle);
        assert!(!h.presenter.close_demo());
    }
}

mod overlay {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn same_origin_demo_gets_a_working_back_bar() {
        let (surface, document) = FakeSurface::same_origin("<h1>Açaí</h1>");
        let h = harness(surface.always(SurfaceEvent::Load));

        h.presenter.open_demo("acai-dany", None).unwrap();
        wait_until_loaded(&h.presenter).await;
        tokio::task::yield_now().await;

        let bars = document.bars();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].id, NAV_BAR_ID);
        assert_eq!(document.padding_top(), Some(50));

        bars[0].back();
        assert!(!h.presenter.state().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn cross_origin_demo_is_left_alone() {
        let h = harness(FakeSurface::cross_origin().always(SurfaceEvent::Load));

        h.presenter.open_demo("acai-dany", None).unwrap();
        wait_until_loaded(&h.presenter).await;

        assert_eq!(h.presenter.state().loading_state, LoadingState::Loaded);
    }
}

mod fullscreen {
    use super::*;

    #[tokio::test]
    async fn toggles_only_while_open() {
        let h = harness(FakeSurface::cross_origin());
        assert_eq!(
            h.presenter.toggle_fullscreen().await,
            Err(FullscreenError::NotOpen)
        );

        h.presenter.open_demo("acai-dany", None).unwrap();
        assert_eq!(h.presenter.toggle_fullscreen().await, Ok(true));
        assert!(h.presenter.state().is_fullscreen);

        assert!(h.presenter.close_demo());
        let state = h.presenter.state();
        assert!(!state.is_fullscreen);
        assert!(state.invariants_hold());
        assert!(h.stage.events().contains(&StageEvent::ExitFullscreen));
    }

    #[tokio::test]
    async fn denied_request_leaves_state_unchanged() {
        let h = harness_with(
            two_project_registry(),
            FakeSurface::cross_origin(),
            RecordingStage::denying_fullscreen(FullscreenError::Unsupported),
        );
        h.presenter.open_demo("acai-dany", None).unwrap();
        let before = h.presenter.state();

        assert_eq!(
            h.presenter.toggle_fullscreen().await,
            Err(FullscreenError::Unsupported)
        );
        assert_eq!(h.presenter.state(), before);
    }

    #[tokio::test]
    async fn platform_exit_clears_the_flag() {
        let h = harness(FakeSurface::cross_origin());
        h.presenter.open_demo("acai-dany", None).unwrap();
        h.presenter.toggle_fullscreen().await.unwrap();

        h.presenter.fullscreen_exited();

        assert!(!h.presenter.state().is_fullscreen);
        assert_eq!(h.presenter.toggle_fullscreen().await, Ok(true));
    }
}

mod menu_and_keys {
    use super::*;

    #[tokio::test]
    async fn menu_needs_an_open_modal_and_focuses_first_item() {
        let h = harness(FakeSurface::cross_origin());
        assert!(!h.presenter.toggle_menu());

        h.presenter.open_demo("acai-dany", None).unwrap();
        assert!(h.presenter.toggle_menu());
        assert!(h.presenter.state().is_menu_open);
        assert_eq!(h.stage.last_focus(), Some(FocusTarget::MenuItem(0)));
    }

    #[tokio::test]
    async fn escape_closes_menu_before_the_modal() {
        let h = harness(FakeSurface::cross_origin());
        h.presenter.open_demo("acai-dany", None).unwrap();
        h.presenter.toggle_menu();

        assert!(h.presenter.handle_key(Key::Escape));
        let state = h.presenter.state();
        assert!(!state.is_menu_open);
        assert!(state.is_open());

        assert!(h.presenter.handle_key(Key::Escape));
        assert!(!h.presenter.state().is_open());
        assert!(!h.presenter.handle_key(Key::Escape));
    }

    #[tokio::test]
    async fn tab_stays_inside_the_modal() {
        let h = harness(FakeSurface::cross_origin());
        h.presenter.open_demo("acai-dany", Some("card")).unwrap();

        let mut seen = Vec::new();
        for _ in 0..8 {
            assert!(h.presenter.handle_key(Key::Tab));
            seen.push(h.stage.last_focus().unwrap());
        }

        assert!(seen
            .iter()
            .all(|target| matches!(target, FocusTarget::Control(_))));
        assert_eq!(seen[3], FocusTarget::Control(ModalControl::Close));

        assert!(h.presenter.handle_key(Key::ShiftTab));
        assert_eq!(
            h.stage.last_focus(),
            Some(FocusTarget::Control(ModalControl::Menu))
        );
    }

    #[tokio::test]
    async fn arrows_browse_without_wrapping() {
        let h = harness(FakeSurface::cross_origin());
        h.presenter.open_demo("acai-dany", None).unwrap();

        assert!(!h.presenter.handle_key(Key::ArrowLeft));
        assert_eq!(
            h.presenter.state().current_project_key.as_deref(),
            Some("acai-dany")
        );

        assert!(h.presenter.handle_key(Key::ArrowRight));
        assert_eq!(
            h.presenter.state().current_project_key.as_deref(),
            Some("barbearia-raimundos")
        );

        assert!(!h.presenter.handle_key(Key::End));
        assert!(h.presenter.handle_key(Key::Home));
        assert_eq!(
            h.presenter.state().current_project_key.as_deref(),
            Some("acai-dany")
        );
    }

    #[tokio::test]
    async fn browsing_can_be_switched_off_in_config() {
        let config = SiteConfig {
            browse_keys: false,
            ..SiteConfig::default()
        };
        let presenter = Presenter::new(
            DemoLoader::from_config(two_project_registry(), &config.loader),
            Arc::new(FakeSurface::cross_origin()),
            Arc::new(RecordingStage::default()),
            PresenterOptions::from_config(&config),
        );
        presenter.open_demo("acai-dany", None).unwrap();

        assert!(!presenter.handle_key(Key::ArrowRight));
        assert_eq!(
            presenter.state().current_project_key.as_deref(),
            Some("acai-dany")
        );
    }

    #[tokio::test]
    async fn keys_are_ignored_while_closed() {
        let h = harness(FakeSurface::cross_origin());
        assert!(!h.presenter.handle_key(Key::Tab));
        assert!(!h.presenter.handle_key(Key::ArrowRight));
    }

    #[tokio::test]
    async fn transitions_close_the_menu_and_block_reopening() {
        let h = harness(FakeSurface::cross_origin());
        h.presenter.open_demo("acai-dany", None).unwrap();
        h.presenter.toggle_menu();

        assert!(h.presenter.begin_transition());
        let state = h.presenter.state();
        assert!(!state.is_menu_open);
        assert!(state.is_transitioning);
        assert!(!h.presenter.open_menu());
        assert!(!h.presenter.begin_transition());

        h.presenter.end_transition();
        assert!(h.presenter.open_menu());
    }
}
