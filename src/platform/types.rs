//! Plain data exchanged with the mapping platform.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

/// Load lifecycle of a platform resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loaded,
    Failed,
}

/// Status reported by an indoor location data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceStatus {
    Starting,
    Started,
    FailedToStart,
    Stopping,
    Stopped,
}

/// Sort direction for a feature query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Parameters for `FeatureTable::query_features`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub where_clause: String,
    pub order_by: Vec<(String, SortOrder)>,
    pub max_features: Option<usize>,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            where_clause: "1=1".to_string(),
            order_by: Vec::new(),
            max_features: None,
        }
    }
}

/// A single feature row: attribute name to value.
pub type Feature = JsonMap<String, Value>;

/// Result of a feature query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub features: Vec<Feature>,
}

impl FeatureSet {
    pub fn first(&self) -> Option<&Feature> {
        self.features.first()
    }
}

/// Descriptive information about a loaded map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapInfo {
    pub item_id: String,
    pub title: String,
}

/// A raw location sample as streamed by the data source.
///
/// Only `source_properties` and `horizontal_accuracy` feed the rendered
/// details; the coordinates are kept for logging.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationSample {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub horizontal_accuracy: f64,
    #[serde(default)]
    pub source_properties: JsonMap<String, Value>,
}

/// Authentication challenge raised by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// Resource URL that requires credentials.
    pub url: String,
    /// How many times credentials were already rejected for this challenge.
    pub previous_failures: u32,
}
