use crate::error::AppError;
use crate::loader::LoadError;
use crate::platform::{DataSourceStatus, LocationSample, MapInfo};
use crate::ui::mvi::Intent;

use super::state::PositioningTableRef;

/// Events that drive the positioning screen.
#[derive(Debug, Clone)]
pub enum PositioningIntent {
    PortalLoaded,
    PortalLoadFailed(AppError),

    MapLoaded(MapInfo),
    MapLoadFailed(AppError),

    /// Every map table and layer reached `Loaded`.
    ResourcesLoaded,
    ResourcesFailed(LoadError),

    PositioningTableResolved(PositioningTableRef),
    PositioningTableMissing {
        name: String,
    },

    PathwaysLayerResolved {
        name: String,
    },
    PathwaysLayerMissing {
        name: String,
    },

    /// The platform refused to construct the data source.
    DataSourceUnavailable(AppError),

    StatusChanged(DataSourceStatus),

    /// `start()` returned an error instead of reporting a status.
    StartCallFailed(AppError),

    LocationReceived(LocationSample),

    /// User pressed start.
    StartRequested,

    /// User pressed stop.
    StopRequested,
}

impl Intent for PositioningIntent {}
