//! Mapping platform boundary.
//!
//! The portal, map, feature tables, layers and the indoor location data
//! source are external collaborators. This module declares the traits they
//! are consumed through, the data they exchange, and an in-memory
//! implementation used by the demo binary and the tests.

mod error;
mod traits;
mod types;

pub mod simulated;

pub use error::{PlatformError, PlatformErrorKind};
pub use traits::{
    EventStream, FeatureLayer, FeatureTable, IndoorsLocationDataSource, LayerNode, Loadable, Map,
    MappingPlatform, Portal,
};
pub use types::{
    AuthChallenge, DataSourceStatus, Feature, FeatureSet, LoadStatus, LocationSample, MapInfo,
    QueryParameters, SortOrder,
};
