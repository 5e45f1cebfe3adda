//! View state for the indoor positioning screen.

use crate::error::ErrorDescriptor;
use crate::platform::MapInfo;
use crate::ui::mvi::UiState;

use super::details::LocationDetails;

/// Lifecycle phase of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Startup pipeline running.
    #[default]
    Init,
    /// Map and positioning resources ready, data source idle.
    MapLoaded,
    /// Data source is starting.
    StartingSource,
    /// Data source is streaming locations.
    Started,
    /// Startup failed. Terminal for the session.
    FailedToStart,
    /// Data source stopped after having started.
    Stopped,
}

/// Label on the start/stop button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonLabel {
    #[default]
    Start,
    Stop,
    Failed,
}

impl ButtonLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonLabel::Start => "Start",
            ButtonLabel::Stop => "Stop",
            ButtonLabel::Failed => "Failed",
        }
    }
}

/// The positioning table found in the map and the row id picked from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositioningTableRef {
    pub name: String,
    pub positioning_id: String,
}

/// Identity of the constructed data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceRef {
    pub positioning_table: String,
    pub pathways_layer: String,
    pub positioning_id: String,
}

/// Everything the view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub phase: Phase,
    pub map: Option<MapInfo>,
    pub positioning_table: Option<PositioningTableRef>,
    pub pathways_layer: Option<String>,
    /// Present only once startup completed; never in `Init`.
    pub data_source: Option<DataSourceRef>,
    pub error: Option<ErrorDescriptor>,
    pub progress_visible: bool,
    pub button_label: ButtonLabel,
    pub button_visible: bool,
    pub location: Option<LocationDetails>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            phase: Phase::Init,
            map: None,
            positioning_table: None,
            pathways_layer: None,
            data_source: None,
            error: None,
            progress_visible: true,
            button_label: ButtonLabel::Start,
            button_visible: false,
            location: None,
        }
    }
}

impl UiState for ViewState {}

impl ViewState {
    /// Whether a user start request is accepted.
    pub fn can_start(&self) -> bool {
        matches!(self.phase, Phase::MapLoaded | Phase::Stopped)
    }

    /// Whether a user stop request is accepted.
    pub fn can_stop(&self) -> bool {
        matches!(self.phase, Phase::Started | Phase::StartingSource)
    }

    /// Whether the data source may be running and needs stopping at teardown.
    pub fn source_active(&self) -> bool {
        self.can_stop()
    }

    /// Whether the location details panel should be shown.
    pub fn details_visible(&self) -> bool {
        self.location.as_ref().is_some_and(|l| l.visible)
    }

    /// One-line status for the header.
    pub fn status_message(&self) -> &'static str {
        match self.phase {
            Phase::Init => "Loading map...",
            Phase::MapLoaded => "Ready",
            Phase::StartingSource => "Starting indoor positioning...",
            Phase::Started => "Indoor positioning running",
            Phase::FailedToStart => "Failed to load",
            Phase::Stopped => "Indoor positioning stopped",
        }
    }

    /// Phase and data-source reference agree with each other.
    pub fn is_consistent(&self) -> bool {
        match self.phase {
            Phase::Init | Phase::FailedToStart => self.data_source.is_none(),
            _ => self.data_source.is_some() && self.map.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_loading() {
        let state = ViewState::default();
        assert_eq!(state.phase, Phase::Init);
        assert!(state.progress_visible);
        assert!(!state.button_visible);
        assert!(state.is_consistent());
        assert_eq!(state.status_message(), "Loading map...");
    }

    #[test]
    fn start_and_stop_gates() {
        let mut state = ViewState::default();
        assert!(!state.can_start());
        assert!(!state.can_stop());

        state.phase = Phase::Stopped;
        assert!(state.can_start());

        state.phase = Phase::StartingSource;
        assert!(state.can_stop());
        assert!(!state.can_start());
    }

    #[test]
    fn button_labels() {
        assert_eq!(ButtonLabel::Start.as_str(), "Start");
        assert_eq!(ButtonLabel::Stop.as_str(), "Stop");
        assert_eq!(ButtonLabel::Failed.as_str(), "Failed");
    }
}
