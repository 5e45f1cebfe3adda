//! State transitions for the positioning screen.

use crate::error::{AppError, ErrorDescriptor};
use crate::platform::DataSourceStatus;
use crate::ui::mvi::Reducer;

use super::details::LocationDetails;
use super::intent::PositioningIntent;
use super::state::{ButtonLabel, DataSourceRef, Phase, ViewState};

pub struct PositioningReducer;

impl Reducer for PositioningReducer {
    type State = ViewState;
    type Intent = PositioningIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match state.phase {
            Phase::Init => reduce_startup(state, intent),
            // Terminal until the screen is torn down.
            Phase::FailedToStart => state,
            _ => reduce_running(state, intent),
        }
    }
}

fn reduce_startup(mut state: ViewState, intent: PositioningIntent) -> ViewState {
    match intent {
        PositioningIntent::PortalLoaded | PositioningIntent::ResourcesLoaded => state,

        PositioningIntent::MapLoaded(info) => {
            state.map = Some(info);
            state
        }

        PositioningIntent::PositioningTableResolved(table) => {
            state.positioning_table = Some(table);
            complete_startup(state)
        }

        PositioningIntent::PathwaysLayerResolved { name } => {
            state.pathways_layer = Some(name);
            complete_startup(state)
        }

        PositioningIntent::PortalLoadFailed(err)
        | PositioningIntent::MapLoadFailed(err)
        | PositioningIntent::DataSourceUnavailable(err) => fail_startup(state, err),

        PositioningIntent::ResourcesFailed(kind) => fail_startup(state, kind.into()),

        PositioningIntent::PositioningTableMissing { name }
        | PositioningIntent::PathwaysLayerMissing { name } => {
            fail_startup(state, AppError::ResourceNotFound { name })
        }

        // Data-source events and user requests cannot happen before the
        // data source exists.
        PositioningIntent::StatusChanged(_)
        | PositioningIntent::StartCallFailed(_)
        | PositioningIntent::LocationReceived(_)
        | PositioningIntent::StartRequested
        | PositioningIntent::StopRequested => state,
    }
}

/// Move to `MapLoaded` once the map and both positioning resources are known.
fn complete_startup(mut state: ViewState) -> ViewState {
    let (Some(_), Some(table), Some(pathways)) = (
        state.map.as_ref(),
        state.positioning_table.as_ref(),
        state.pathways_layer.as_ref(),
    ) else {
        return state;
    };

    state.data_source = Some(DataSourceRef {
        positioning_table: table.name.clone(),
        pathways_layer: pathways.clone(),
        positioning_id: table.positioning_id.clone(),
    });
    state.phase = Phase::MapLoaded;
    state.progress_visible = false;
    state.button_visible = true;
    state.button_label = ButtonLabel::Start;
    state
}

fn fail_startup(mut state: ViewState, error: AppError) -> ViewState {
    state.phase = Phase::FailedToStart;
    state.error = Some(ErrorDescriptor::from(error));
    state.data_source = None;
    state.location = None;
    state.progress_visible = false;
    state.button_visible = true;
    state.button_label = ButtonLabel::Failed;
    state
}

fn reduce_running(mut state: ViewState, intent: PositioningIntent) -> ViewState {
    match intent {
        PositioningIntent::StartRequested
        | PositioningIntent::StatusChanged(DataSourceStatus::Starting) => {
            if state.can_start() {
                state.phase = Phase::StartingSource;
                state.error = None;
                state.location = None;
                state.progress_visible = true;
                state.button_visible = false;
            }
            state
        }

        PositioningIntent::StatusChanged(DataSourceStatus::Started) => {
            state.phase = Phase::Started;
            state.error = None;
            state.progress_visible = false;
            state.button_visible = true;
            state.button_label = ButtonLabel::Stop;
            state
        }

        PositioningIntent::StatusChanged(DataSourceStatus::FailedToStart) => {
            back_to_ready(state, AppError::DataSourceFailedToStart { reason: None })
        }

        PositioningIntent::StartCallFailed(err) => back_to_ready(state, err),

        PositioningIntent::StopRequested => {
            // A stop during startup is left to the status stream, which
            // resolves to Stopped on its own.
            if state.phase == Phase::Started {
                state.phase = Phase::MapLoaded;
                state.location = None;
                state.progress_visible = false;
                state.button_visible = true;
                state.button_label = ButtonLabel::Start;
            }
            state
        }

        PositioningIntent::StatusChanged(DataSourceStatus::Stopping) => state,

        PositioningIntent::StatusChanged(DataSourceStatus::Stopped) => {
            if matches!(state.phase, Phase::Started | Phase::StartingSource) {
                state.phase = Phase::Stopped;
            }
            state.location = None;
            state.progress_visible = false;
            state.button_visible = true;
            state.button_label = ButtonLabel::Start;
            state
        }

        PositioningIntent::LocationReceived(sample) => {
            if state.phase == Phase::Started {
                state.location = Some(LocationDetails::from_sample(&sample));
            }
            state
        }

        // Startup events are stale once startup has finished.
        PositioningIntent::PortalLoaded
        | PositioningIntent::PortalLoadFailed(_)
        | PositioningIntent::MapLoaded(_)
        | PositioningIntent::MapLoadFailed(_)
        | PositioningIntent::ResourcesLoaded
        | PositioningIntent::ResourcesFailed(_)
        | PositioningIntent::PositioningTableResolved(_)
        | PositioningIntent::PositioningTableMissing { .. }
        | PositioningIntent::PathwaysLayerResolved { .. }
        | PositioningIntent::PathwaysLayerMissing { .. }
        | PositioningIntent::DataSourceUnavailable(_) => state,
    }
}

/// Recoverable data-source failure: back to the pre-start phase with the
/// error shown.
fn back_to_ready(mut state: ViewState, error: AppError) -> ViewState {
    state.phase = Phase::MapLoaded;
    state.error = Some(ErrorDescriptor::from(error));
    state.location = None;
    state.progress_visible = false;
    state.button_visible = true;
    state.button_label = ButtonLabel::Start;
    state
}
