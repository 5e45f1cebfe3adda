//! Capability surface consumed from the mapping platform.
//!
//! Everything here is implemented by the platform SDK (or by
//! [`super::simulated`] in tests and the demo). This crate only drives
//! these collaborators and observes their results.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::auth::ChallengeHandler;

use super::error::PlatformError;
use super::types::{
    DataSourceStatus, FeatureSet, LoadStatus, LocationSample, MapInfo, QueryParameters,
};

/// Ordered stream of platform events. Dropping the receiver cancels the
/// subscription.
pub type EventStream<T> = mpsc::Receiver<T>;

/// A resource with an explicit load lifecycle.
#[async_trait]
pub trait Loadable: Send + Sync {
    /// Name used for lookup and logging.
    fn name(&self) -> &str;

    fn load_status(&self) -> LoadStatus;

    /// Load the resource, retrying a previous failure if there was one.
    async fn retry_load(&self) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait Portal: Send + Sync {
    fn url(&self) -> &str;

    async fn load(&self) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait Map: Send + Sync {
    fn info(&self) -> MapInfo;

    async fn load(&self) -> Result<(), PlatformError>;

    /// Standalone tables attached to the map.
    fn tables(&self) -> Vec<Arc<dyn FeatureTable>>;

    /// Root of the operational layer tree.
    fn operational_layers(&self) -> Vec<LayerNode>;
}

#[async_trait]
pub trait FeatureTable: Loadable {
    async fn query_features(&self, params: &QueryParameters)
        -> Result<FeatureSet, PlatformError>;
}

pub trait FeatureLayer: Loadable {
    /// Table backing this layer.
    fn feature_table(&self) -> Arc<dyn FeatureTable>;
}

/// Node of the operational layer tree.
#[derive(Clone)]
pub enum LayerNode {
    Feature(Arc<dyn FeatureLayer>),
    Group { name: String, children: Vec<LayerNode> },
}

impl LayerNode {
    pub fn name(&self) -> &str {
        match self {
            LayerNode::Feature(layer) => layer.name(),
            LayerNode::Group { name, .. } => name,
        }
    }
}

impl std::fmt::Debug for LayerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerNode::Feature(layer) => write!(f, "Feature({})", layer.name()),
            LayerNode::Group { name, children } => f
                .debug_struct("Group")
                .field("name", name)
                .field("children", children)
                .finish(),
        }
    }
}

/// Fused indoor positioning provider.
#[async_trait]
pub trait IndoorsLocationDataSource: Send + Sync {
    async fn start(&self) -> Result<(), PlatformError>;

    async fn stop(&self) -> Result<(), PlatformError>;

    /// Subscribe to status changes. A new subscription replaces the old one.
    fn status_stream(&self) -> EventStream<DataSourceStatus>;

    /// Subscribe to location samples. A new subscription replaces the old one.
    fn location_stream(&self) -> EventStream<LocationSample>;
}

/// Entry point into the platform: creates portals, maps and data sources.
pub trait MappingPlatform: Send + Sync {
    fn set_challenge_handler(&self, handler: Arc<dyn ChallengeHandler>);

    fn portal(&self, url: &str) -> Arc<dyn Portal>;

    fn map(&self, portal: Arc<dyn Portal>, item_id: &str) -> Arc<dyn Map>;

    fn create_data_source(
        &self,
        positioning_table: Arc<dyn FeatureTable>,
        pathways: Arc<dyn FeatureLayer>,
        positioning_id: &str,
    ) -> Result<Arc<dyn IndoorsLocationDataSource>, PlatformError>;
}
