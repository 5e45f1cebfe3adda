//! Locating the positioning table and pathways layer inside a loaded map.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::PositioningConfig;
use crate::platform::{
    FeatureLayer, FeatureTable, LayerNode, LoadStatus, Loadable, Map, PlatformError,
    QueryParameters, SortOrder,
};

/// A loadable resource owned by a map.
#[derive(Clone)]
pub enum MapResource {
    Table(Arc<dyn FeatureTable>),
    Layer(Arc<dyn FeatureLayer>),
}

#[async_trait]
impl Loadable for MapResource {
    fn name(&self) -> &str {
        match self {
            MapResource::Table(table) => table.name(),
            MapResource::Layer(layer) => layer.name(),
        }
    }

    fn load_status(&self) -> LoadStatus {
        match self {
            MapResource::Table(table) => table.load_status(),
            MapResource::Layer(layer) => layer.load_status(),
        }
    }

    async fn retry_load(&self) -> Result<(), PlatformError> {
        match self {
            MapResource::Table(table) => table.retry_load().await,
            MapResource::Layer(layer) => layer.retry_load().await,
        }
    }
}

/// All tables of `map` followed by every feature layer in its layer tree.
pub fn map_resources(map: &dyn Map) -> Vec<MapResource> {
    let mut resources: Vec<MapResource> =
        map.tables().into_iter().map(MapResource::Table).collect();
    resources.extend(
        feature_layers(&map.operational_layers())
            .into_iter()
            .map(MapResource::Layer),
    );
    resources
}

/// First table named `name`.
pub fn find_table(map: &dyn Map, name: &str) -> Option<Arc<dyn FeatureTable>> {
    map.tables().into_iter().find(|table| table.name() == name)
}

/// First feature layer named `name`, searching group layers depth-first.
pub fn find_feature_layer(layers: &[LayerNode], name: &str) -> Option<Arc<dyn FeatureLayer>> {
    feature_layers(layers)
        .into_iter()
        .find(|layer| layer.name() == name)
}

/// Every feature layer in the tree, in pre-order.
///
/// Uses an explicit stack so deeply nested groups cannot overflow.
fn feature_layers(layers: &[LayerNode]) -> Vec<Arc<dyn FeatureLayer>> {
    let mut found = Vec::new();
    let mut stack: Vec<&LayerNode> = layers.iter().rev().collect();

    while let Some(node) = stack.pop() {
        match node {
            LayerNode::Feature(layer) => found.push(Arc::clone(layer)),
            LayerNode::Group { children, .. } => stack.extend(children.iter().rev()),
        }
    }

    found
}

/// Query `table` for the newest positioning row and return its id.
///
/// `Ok(None)` means the table has no row or the row has no id.
pub async fn query_positioning_id(
    table: &dyn FeatureTable,
    config: &PositioningConfig,
) -> Result<Option<String>, PlatformError> {
    let params = QueryParameters {
        where_clause: "1=1".to_string(),
        order_by: vec![(config.order_by_field.clone(), SortOrder::Descending)],
        max_features: Some(1),
    };

    let result = table.query_features(&params).await?;
    let id = result
        .first()
        .and_then(|row| row.get(&config.id_field))
        .and_then(|value| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

    Ok(id)
}
