//! Shared test utilities.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use indoorview::config::{AuthConfig, PositioningConfig};
use indoorview::platform::simulated::{Scenario, SimPlatform};
use indoorview::platform::{LocationSample, MappingPlatform};
use indoorview::session::{PositioningSession, SessionHandle, SessionSettings};
use indoorview::ui::positioning::ViewState;
use serde_json::{json, Value};
use tokio::sync::watch;

/// Session settings with auto-start off and a password variable that is
/// never set.
pub fn settings() -> SessionSettings {
    SessionSettings {
        positioning: PositioningConfig {
            auto_start: false,
            ..PositioningConfig::default()
        },
        auth: AuthConfig {
            password_env: "INDOORVIEW_TEST_UNSET_PASSWORD_VAR".to_string(),
            ..AuthConfig::default()
        },
        ..SessionSettings::default()
    }
}

pub fn auto_start_settings() -> SessionSettings {
    let mut settings = settings();
    settings.positioning.auto_start = true;
    settings
}

pub fn sample(accuracy: f64, props: Value) -> LocationSample {
    LocationSample {
        horizontal_accuracy: accuracy,
        source_properties: props.as_object().cloned().unwrap_or_default(),
        ..LocationSample::default()
    }
}

pub fn ble_sample() -> LocationSample {
    sample(
        2.4318,
        json!({"positionSource": "BLE", "floor": 1, "transmitterCount": 5}),
    )
}

/// The demo building replaying `samples` once.
pub fn building(samples: Vec<LocationSample>) -> Scenario {
    let mut scenario = Scenario::demo();
    scenario.data_source.samples = samples;
    scenario.data_source.repeat_samples = false;
    scenario
}

pub fn spawn(scenario: Scenario, settings: SessionSettings) -> (Arc<SimPlatform>, SessionHandle) {
    let platform = Arc::new(SimPlatform::new(scenario));
    let handle =
        PositioningSession::spawn(Arc::clone(&platform) as Arc<dyn MappingPlatform>, settings);
    (platform, handle)
}

/// Wait until a published snapshot satisfies `pred`.
pub async fn wait_for<F>(rx: &mut watch::Receiver<ViewState>, pred: F) -> ViewState
where
    F: Fn(&ViewState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(60), async {
        loop {
            {
                let state = rx.borrow_and_update();
                if pred(&state) {
                    return state.clone();
                }
            }
            rx.changed()
                .await
                .expect("session ended before the condition was met");
        }
    })
    .await
    .expect("timed out waiting for view state")
}
