mod common;

use std::time::Duration;

use common::{auto_start_settings, ble_sample, building, settings, spawn, wait_for};
use indoorview::error::{AppError, AuthErrorKind};
use indoorview::platform::simulated::{
    AuthScenario, LayerScenario, Scenario, SimOutcome, StartOutcome,
};
use indoorview::ui::positioning::{ButtonLabel, Phase};

#[tokio::test(start_paused = true)]
async fn auto_start_reaches_started_and_shows_details() {
    let (platform, session) = spawn(building(vec![ble_sample()]), auto_start_settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| {
        assert!(s.is_consistent(), "inconsistent state: {:?}", s);
        s.phase == Phase::Started && s.details_visible()
    })
    .await;

    assert_eq!(state.button_label, ButtonLabel::Stop);
    assert!(state.button_visible);
    assert!(!state.progress_visible);
    assert!(state.error.is_none());

    let data_source = state.data_source.expect("data source ref");
    assert_eq!(data_source.positioning_table, "IPS_Positioning");
    assert_eq!(data_source.pathways_layer, "Pathways");
    assert_eq!(
        data_source.positioning_id,
        "{1A7E1B3C-0000-4000-8000-000000000002}"
    );

    let lines = state.location.expect("details").lines();
    assert_eq!(
        lines,
        vec![
            "Floor: 1",
            "Position source: BLE",
            "Horizontal accuracy: 2.4318 m",
            "Number of transmitters: 5",
        ]
    );

    let source = platform.data_source().expect("data source built");
    assert_eq!(source.start_calls(), 1);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn without_auto_start_waits_for_user() {
    let (platform, session) = spawn(building(vec![ble_sample()]), settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::MapLoaded).await;
    assert_eq!(state.button_label, ButtonLabel::Start);
    assert!(state.button_visible);
    assert!(!state.progress_visible);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let source = platform.data_source().expect("data source built");
    assert_eq!(source.start_calls(), 0);
    assert_eq!(session.snapshot().phase, Phase::MapLoaded);

    session.start().await;
    wait_for(&mut rx, |s| s.phase == Phase::Started).await;
    assert_eq!(source.start_calls(), 1);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn user_stop_then_restart() {
    let (platform, session) = spawn(building(vec![ble_sample()]), auto_start_settings());
    let mut rx = session.subscribe();
    wait_for(&mut rx, |s| s.phase == Phase::Started && s.details_visible()).await;

    session.stop().await;
    let state = wait_for(&mut rx, |s| s.phase == Phase::MapLoaded).await;
    assert_eq!(state.button_label, ButtonLabel::Start);
    assert!(!state.details_visible());

    // The trailing Stopped status leaves the screen ready.
    tokio::time::sleep(Duration::from_secs(1)).await;
    let state = session.snapshot();
    assert_eq!(state.phase, Phase::MapLoaded);
    assert!(state.location.is_none());

    session.start().await;
    wait_for(&mut rx, |s| s.phase == Phase::Started).await;

    let source = platform.data_source().expect("data source built");
    assert_eq!(source.start_calls(), 2);
    assert_eq!(source.stop_calls(), 1);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stop_while_starting_resolves_to_stopped() {
    let (platform, session) = spawn(building(vec![ble_sample()]), auto_start_settings());
    let mut rx = session.subscribe();
    wait_for(&mut rx, |s| s.phase == Phase::StartingSource).await;

    // Let the start call run; the simulated start delay is longer.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.snapshot().phase, Phase::StartingSource);

    session.stop().await;
    let state = wait_for(&mut rx, |s| s.phase == Phase::Stopped).await;
    assert_eq!(state.button_label, ButtonLabel::Start);
    assert!(state.button_visible);
    assert!(!state.progress_visible);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(session.snapshot().phase, Phase::Stopped);

    let source = platform.data_source().expect("data source built");
    assert_eq!(source.stop_calls(), 1);

    session.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn start_then_stop_is_applied_in_order() {
    let mut scenario = building(vec![ble_sample()]);
    scenario.data_source.start_delay_ms = 20;

    for _ in 0..20 {
        let (platform, session) = spawn(scenario.clone(), settings());
        let mut rx = session.subscribe();
        wait_for(&mut rx, |s| s.phase == Phase::MapLoaded).await;

        session.start().await;
        session.stop().await;

        wait_for(&mut rx, |s| s.phase == Phase::Stopped).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let source = platform.data_source().expect("data source built");
        assert_eq!(session.snapshot().phase, Phase::Stopped);
        assert_eq!(source.start_calls(), 1);
        assert_eq!(source.stop_calls(), 1);
        assert!(!source.is_running());

        session.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn failed_start_status_returns_to_ready_with_error() {
    let mut scenario = building(vec![ble_sample()]);
    scenario.data_source.start = StartOutcome::FailedToStart;
    let (platform, session) = spawn(scenario, auto_start_settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::MapLoaded && s.error.is_some()).await;
    assert_eq!(state.button_label, ButtonLabel::Start);
    assert!(state.button_visible);
    assert_eq!(
        state.error.expect("error").error,
        AppError::DataSourceFailedToStart { reason: None }
    );

    // Recoverable: the user may try again.
    session.start().await;
    wait_for(&mut rx, |s| s.phase == Phase::StartingSource).await;
    wait_for(&mut rx, |s| s.phase == Phase::MapLoaded && s.error.is_some()).await;
    assert_eq!(platform.data_source().expect("source").start_calls(), 2);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn start_call_error_returns_to_ready_with_reason() {
    let mut scenario = building(Vec::new());
    scenario.data_source.start = StartOutcome::Error {
        message: "bluetooth is off".to_string(),
    };
    let (_platform, session) = spawn(scenario, auto_start_settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::MapLoaded && s.error.is_some()).await;
    assert_eq!(
        state.error.expect("error").error,
        AppError::DataSourceFailedToStart {
            reason: Some("bluetooth is off".to_string())
        }
    );

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn offline_portal_fails_startup() {
    let mut scenario = Scenario::demo();
    scenario.portal = SimOutcome::NoInternet;
    let (platform, session) = spawn(scenario, auto_start_settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::FailedToStart).await;
    assert_eq!(state.button_label, ButtonLabel::Failed);
    assert!(state.button_visible);
    assert!(!state.progress_visible);
    assert!(state.data_source.is_none());

    let error = state.error.expect("error");
    assert_eq!(error.error, AppError::Connectivity);
    assert_eq!(error.message, "No internet connection");
    assert!(platform.data_source().is_none());

    // Terminal: user requests are ignored.
    session.start().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(session.snapshot().phase, Phase::FailedToStart);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn map_load_error_is_generic() {
    let mut scenario = Scenario::demo();
    scenario.map.load = SimOutcome::Error {
        message: "item is corrupt".to_string(),
    };
    let (_platform, session) = spawn(scenario, settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::FailedToStart).await;
    assert!(matches!(
        state.error.expect("error").error,
        AppError::GenericLoad { .. }
    ));

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn offline_layer_load_is_connectivity() {
    let mut scenario = Scenario::demo();
    scenario.map.layers.insert(
        0,
        LayerScenario::Feature {
            name: "Basemap".to_string(),
            load: SimOutcome::NoInternet,
        },
    );
    let (platform, session) = spawn(scenario, settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::FailedToStart).await;
    assert_eq!(state.error.expect("error").error, AppError::Connectivity);
    assert!(platform.data_source().is_none());

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn missing_pathways_layer_is_resource_not_found() {
    let mut scenario = Scenario::demo();
    scenario.map.layers.truncate(1);
    let (platform, session) = spawn(scenario, settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::FailedToStart).await;
    assert_eq!(
        state.error.expect("error").error,
        AppError::ResourceNotFound {
            name: "Pathways".to_string()
        }
    );
    assert!(state.data_source.is_none());
    assert!(platform.data_source().is_none());

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn empty_positioning_table_is_resource_not_found() {
    let mut scenario = Scenario::demo();
    scenario.map.tables[0].rows.clear();
    let (_platform, session) = spawn(scenario, settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::FailedToStart).await;
    assert_eq!(
        state.error.expect("error").error,
        AppError::ResourceNotFound {
            name: "IPS_Positioning".to_string()
        }
    );

    session.shutdown().await;
}

fn secured(username: &str, password: &str) -> Scenario {
    let mut scenario = building(vec![ble_sample()]);
    scenario.auth = Some(AuthScenario {
        username: username.to_string(),
        password: password.to_string(),
    });
    scenario
}

#[tokio::test(start_paused = true)]
async fn configured_credentials_answer_the_challenge() {
    let mut settings = settings();
    settings.auth.username = Some("viewer".to_string());
    settings.auth.password = Some("secret".to_string());

    let (_platform, session) = spawn(secured("viewer", "secret"), settings);
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase != Phase::Init).await;
    assert_eq!(state.phase, Phase::MapLoaded);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn wrong_password_is_invalid_credentials() {
    let mut settings = settings();
    settings.auth.username = Some("viewer".to_string());
    settings.auth.password = Some("guess".to_string());

    let (_platform, session) = spawn(secured("viewer", "secret"), settings);
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::FailedToStart).await;
    assert_eq!(
        state.error.expect("error").error,
        AppError::Authentication(AuthErrorKind::InvalidCredentials)
    );

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn no_credentials_is_token_required() {
    let (_platform, session) = spawn(secured("viewer", "secret"), settings());
    let mut rx = session.subscribe();

    let state = wait_for(&mut rx, |s| s.phase == Phase::FailedToStart).await;
    assert_eq!(
        state.error.expect("error").error,
        AppError::Authentication(AuthErrorKind::TokenRequired)
    );

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_source_and_freezes_state() {
    let mut scenario = building(vec![ble_sample()]);
    scenario.data_source.repeat_samples = true;
    let (platform, session) = spawn(scenario, auto_start_settings());
    let mut rx = session.subscribe();
    wait_for(&mut rx, |s| s.phase == Phase::Started && s.details_visible()).await;

    let source = platform.data_source().expect("data source built");
    assert!(source.has_status_subscriber());

    session.shutdown().await;
    let frozen = rx.borrow_and_update().clone();

    assert_eq!(source.stop_calls(), 1);
    assert!(!source.has_status_subscriber());

    // Late platform events go nowhere.
    source
        .emit_status(indoorview::platform::DataSourceStatus::Stopped)
        .await;
    source.emit_sample(ble_sample()).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(*rx.borrow(), frozen);
    assert_eq!(frozen.phase, Phase::Started);
}

#[tokio::test(start_paused = true)]
async fn teardown_while_starting_leaves_source_stopped() {
    let (platform, session) = spawn(building(vec![ble_sample()]), auto_start_settings());
    let mut rx = session.subscribe();
    wait_for(&mut rx, |s| s.phase == Phase::StartingSource).await;

    session.shutdown().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let source = platform.data_source().expect("data source built");
    assert_eq!(source.start_calls(), 1);
    assert_eq!(source.stop_calls(), 1);
    assert!(!source.is_running());
    assert_eq!(rx.borrow().phase, Phase::StartingSource);
}

#[tokio::test(start_paused = true)]
async fn teardown_during_startup_publishes_nothing_more() {
    let (platform, session) = spawn(Scenario::demo(), auto_start_settings());
    let mut rx = session.subscribe();

    session.shutdown().await;
    let frozen = rx.borrow_and_update().clone();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(*rx.borrow(), frozen);
    if let Some(source) = platform.data_source() {
        assert_eq!(source.start_calls(), 0);
    }
}
