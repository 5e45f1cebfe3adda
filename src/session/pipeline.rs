//! Sequential startup: portal, map, resources, table and layer, data source.
//!
//! Each stage reports its outcome to the projector before the next stage
//! begins. The first failure ends the pipeline.

use std::sync::Arc;

use crate::auth::CredentialChallengeHandler;
use crate::error::AppError;
use crate::loader::{load_all, LoadError};
use crate::platform::{IndoorsLocationDataSource, MappingPlatform};
use crate::resolve::{find_feature_layer, find_table, map_resources, query_positioning_id};
use crate::ui::positioning::{Phase, PositioningIntent, PositioningTableRef};

use super::projector::ViewStateProjector;
use super::SessionSettings;

/// Run the startup pipeline. Returns the constructed data source when every
/// stage succeeded.
pub async fn run_startup(
    platform: &dyn MappingPlatform,
    settings: &SessionSettings,
    projector: &mut ViewStateProjector,
) -> Option<Arc<dyn IndoorsLocationDataSource>> {
    platform.set_challenge_handler(Arc::new(CredentialChallengeHandler::new(
        settings.auth.clone(),
    )));

    tracing::info!(url = %settings.portal.url, "Loading portal");
    let portal = platform.portal(&settings.portal.url);
    if let Err(err) = portal.load().await {
        projector.apply(PositioningIntent::PortalLoadFailed(AppError::from_platform(
            &err,
        )));
        return None;
    }
    projector.apply(PositioningIntent::PortalLoaded);

    tracing::info!(item_id = %settings.portal.map_item_id, "Loading map");
    let map = platform.map(portal, &settings.portal.map_item_id);
    if let Err(err) = map.load().await {
        projector.apply(PositioningIntent::MapLoadFailed(AppError::from_platform(&err)));
        return None;
    }
    projector.apply(PositioningIntent::MapLoaded(map.info()));

    let resources = map_resources(map.as_ref());
    tracing::debug!(count = resources.len(), "Loading map resources");
    if let Err(kind) = load_all(&resources).await {
        projector.apply(PositioningIntent::ResourcesFailed(kind));
        return None;
    }
    projector.apply(PositioningIntent::ResourcesLoaded);

    let positioning = &settings.positioning;
    let Some(table) = find_table(map.as_ref(), &positioning.table_name) else {
        projector.apply(PositioningIntent::PositioningTableMissing {
            name: positioning.table_name.clone(),
        });
        return None;
    };

    let positioning_id = match query_positioning_id(table.as_ref(), positioning).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            tracing::warn!(table = %positioning.table_name, "No positioning row found");
            projector.apply(PositioningIntent::PositioningTableMissing {
                name: positioning.table_name.clone(),
            });
            return None;
        }
        Err(err) => {
            tracing::warn!(error = %err, "Positioning query failed");
            let kind = if err.is_no_internet() {
                LoadError::NoInternet
            } else {
                LoadError::Generic
            };
            projector.apply(PositioningIntent::ResourcesFailed(kind));
            return None;
        }
    };
    projector.apply(PositioningIntent::PositioningTableResolved(
        PositioningTableRef {
            name: positioning.table_name.clone(),
            positioning_id: positioning_id.clone(),
        },
    ));

    let Some(pathways) =
        find_feature_layer(&map.operational_layers(), &positioning.pathways_layer_name)
    else {
        projector.apply(PositioningIntent::PathwaysLayerMissing {
            name: positioning.pathways_layer_name.clone(),
        });
        return None;
    };

    let data_source = match platform.create_data_source(table, pathways, &positioning_id) {
        Ok(source) => source,
        Err(err) => {
            projector.apply(PositioningIntent::DataSourceUnavailable(
                AppError::from_platform(&err),
            ));
            return None;
        }
    };
    projector.apply(PositioningIntent::PathwaysLayerResolved {
        name: positioning.pathways_layer_name.clone(),
    });

    (projector.state().phase == Phase::MapLoaded).then_some(data_source)
}
