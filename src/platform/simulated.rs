//! In-memory mapping platform driven by a [`Scenario`].
//!
//! Stands in for the proprietary SDK in the demo binary and in tests. Every
//! outcome (portal and map loads, table loads, authentication, data-source
//! start, streamed samples) is scripted by the scenario.

use std::cmp::Ordering as CmpOrdering;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::auth::{ChallengeDisposition, ChallengeHandler};

use super::error::PlatformError;
use super::traits::{
    EventStream, FeatureLayer, FeatureTable, IndoorsLocationDataSource, LayerNode, Loadable, Map,
    MappingPlatform, Portal,
};
use super::types::{
    AuthChallenge, DataSourceStatus, Feature, FeatureSet, LoadStatus, LocationSample, MapInfo,
    QueryParameters, SortOrder,
};

const STREAM_CAPACITY: usize = 64;

/// Upper bound on challenge rounds for a single portal load.
const MAX_CHALLENGE_ROUNDS: u32 = 10;

/// Errors reading a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Scripted result of a load or call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SimOutcome {
    #[default]
    Ok,
    NoInternet,
    NotFound,
    Auth { code: String },
    Error { message: String },
}

impl SimOutcome {
    fn into_result(self, what: &str) -> Result<(), PlatformError> {
        match self {
            SimOutcome::Ok => Ok(()),
            SimOutcome::NoInternet => Err(PlatformError::no_internet(format!(
                "{}: the internet connection appears to be offline",
                what
            ))),
            SimOutcome::NotFound => Err(PlatformError::new(
                super::error::PlatformErrorKind::NotFound,
                format!("{}: not found", what),
            )),
            SimOutcome::Auth { code } => Err(PlatformError::authentication(
                code.clone(),
                format!("{}: authentication failed ({})", what, code),
            )),
            SimOutcome::Error { message } => {
                Err(PlatformError::other(format!("{}: {}", what, message)))
            }
        }
    }
}

/// Full description of a simulated world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub portal: SimOutcome,
    /// When set, loading the portal raises an authentication challenge.
    #[serde(default)]
    pub auth: Option<AuthScenario>,
    #[serde(default)]
    pub map: MapScenario,
    #[serde(default)]
    pub data_source: DataSourceScenario,
}

/// Credentials the simulated portal accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthScenario {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapScenario {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub load: SimOutcome,
    #[serde(default)]
    pub tables: Vec<TableScenario>,
    #[serde(default)]
    pub layers: Vec<LayerScenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableScenario {
    pub name: String,
    #[serde(default)]
    pub load: SimOutcome,
    #[serde(default)]
    pub query: SimOutcome,
    #[serde(default)]
    pub rows: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerScenario {
    Feature {
        name: String,
        #[serde(default)]
        load: SimOutcome,
    },
    Group {
        name: String,
        #[serde(default)]
        children: Vec<LayerScenario>,
    },
}

/// How `start()` behaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartOutcome {
    /// Emits `Starting`, then `Started` after the delay.
    #[default]
    Started,
    /// Emits `Starting`, then `FailedToStart` after the delay.
    FailedToStart,
    /// `start()` itself returns an error.
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceScenario {
    #[serde(default)]
    pub start: StartOutcome,
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    #[serde(default)]
    pub samples: Vec<LocationSample>,
    /// Replay samples forever instead of once.
    #[serde(default)]
    pub repeat_samples: bool,
}

fn default_start_delay_ms() -> u64 {
    500
}

fn default_sample_interval_ms() -> u64 {
    1000
}

impl Default for DataSourceScenario {
    fn default() -> Self {
        Self {
            start: StartOutcome::default(),
            start_delay_ms: default_start_delay_ms(),
            sample_interval_ms: default_sample_interval_ms(),
            samples: Vec::new(),
            repeat_samples: false,
        }
    }
}

impl Scenario {
    /// Load a scenario from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScenarioError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ScenarioError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// A building with a positioning table, a pathways layer nested in a
    /// group, and a data source that cycles through BLE, Wi-Fi and GNSS
    /// samples.
    pub fn demo() -> Self {
        let sample = |source: &str, floor: Option<Value>, accuracy: f64, extra: (&str, u64)| {
            let mut props = serde_json::Map::new();
            props.insert("positionSource".to_string(), json!(source));
            if let Some(floor) = floor {
                props.insert("floor".to_string(), floor);
            }
            props.insert(extra.0.to_string(), json!(extra.1));
            LocationSample {
                x: -117.195,
                y: 34.057,
                horizontal_accuracy: accuracy,
                source_properties: props,
            }
        };

        let row = |id: &str, created: u64| {
            let mut row = Feature::new();
            row.insert("GlobalID".to_string(), json!(id));
            row.insert("DATE_CREATED".to_string(), json!(created));
            row
        };

        Scenario {
            portal: SimOutcome::Ok,
            auth: None,
            map: MapScenario {
                title: "Indoor demo campus".to_string(),
                load: SimOutcome::Ok,
                tables: vec![TableScenario {
                    name: "IPS_Positioning".to_string(),
                    load: SimOutcome::Ok,
                    query: SimOutcome::Ok,
                    rows: vec![
                        row("{1A7E1B3C-0000-4000-8000-000000000001}", 1_650_000_000),
                        row("{1A7E1B3C-0000-4000-8000-000000000002}", 1_700_000_000),
                    ],
                }],
                layers: vec![
                    LayerScenario::Feature {
                        name: "Levels".to_string(),
                        load: SimOutcome::Ok,
                    },
                    LayerScenario::Group {
                        name: "Indoors".to_string(),
                        children: vec![
                            LayerScenario::Feature {
                                name: "Rooms".to_string(),
                                load: SimOutcome::Ok,
                            },
                            LayerScenario::Feature {
                                name: "Pathways".to_string(),
                                load: SimOutcome::Ok,
                            },
                        ],
                    },
                ],
            },
            data_source: DataSourceScenario {
                start: StartOutcome::Started,
                start_delay_ms: 800,
                sample_interval_ms: 1000,
                samples: vec![
                    sample("BLE", Some(json!(1)), 2.4318, ("transmitterCount", 5)),
                    sample("BLE", Some(json!("2")), 1.90776, ("transmitterCount", 7)),
                    sample("WIFI", Some(json!(2)), 6.5, ("transmitterCount", 3)),
                    sample("GNSS", None, 12.0, ("satelliteCount", 9)),
                    sample("BLE", Some(json!(3)), 0.0, ("transmitterCount", 4)),
                ],
                repeat_samples: true,
            },
        }
    }
}

/// Simulated platform. Holds the challenge handler and remembers the last
/// data source it built so tests can drive it.
pub struct SimPlatform {
    scenario: Scenario,
    handler: Arc<Mutex<Option<Arc<dyn ChallengeHandler>>>>,
    last_data_source: Mutex<Option<Arc<SimDataSource>>>,
}

impl SimPlatform {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            handler: Arc::new(Mutex::new(None)),
            last_data_source: Mutex::new(None),
        }
    }

    /// The most recently constructed data source.
    pub fn data_source(&self) -> Option<Arc<SimDataSource>> {
        self.last_data_source.lock().clone()
    }
}

impl MappingPlatform for SimPlatform {
    fn set_challenge_handler(&self, handler: Arc<dyn ChallengeHandler>) {
        *self.handler.lock() = Some(handler);
    }

    fn portal(&self, url: &str) -> Arc<dyn Portal> {
        Arc::new(SimPortal {
            url: url.to_string(),
            outcome: self.scenario.portal.clone(),
            auth: self.scenario.auth.clone(),
            handler: Arc::clone(&self.handler),
        })
    }

    fn map(&self, _portal: Arc<dyn Portal>, item_id: &str) -> Arc<dyn Map> {
        Arc::new(SimMap::new(item_id, &self.scenario.map))
    }

    fn create_data_source(
        &self,
        positioning_table: Arc<dyn FeatureTable>,
        pathways: Arc<dyn FeatureLayer>,
        positioning_id: &str,
    ) -> Result<Arc<dyn IndoorsLocationDataSource>, PlatformError> {
        tracing::debug!(
            table = positioning_table.name(),
            pathways = pathways.name(),
            positioning_id,
            "Simulated data source created"
        );
        let source = Arc::new(SimDataSource::new(self.scenario.data_source.clone()));
        *self.last_data_source.lock() = Some(Arc::clone(&source));
        Ok(source)
    }
}

struct SimPortal {
    url: String,
    outcome: SimOutcome,
    auth: Option<AuthScenario>,
    handler: Arc<Mutex<Option<Arc<dyn ChallengeHandler>>>>,
}

#[async_trait]
impl Portal for SimPortal {
    fn url(&self) -> &str {
        &self.url
    }

    async fn load(&self) -> Result<(), PlatformError> {
        self.outcome.clone().into_result("portal")?;

        let Some(expected) = &self.auth else {
            return Ok(());
        };

        let handler = self.handler.lock().clone();
        let Some(handler) = handler else {
            return Err(PlatformError::authentication(
                "token_required",
                "portal requires sign-in",
            ));
        };

        let mut previous_failures = 0;
        while previous_failures < MAX_CHALLENGE_ROUNDS {
            let challenge = AuthChallenge {
                url: self.url.clone(),
                previous_failures,
            };
            match handler.handle(&challenge) {
                ChallengeDisposition::UseCredential(credential) => {
                    if credential.username == expected.username
                        && credential.password.expose() == expected.password
                    {
                        return Ok(());
                    }
                    previous_failures += 1;
                }
                ChallengeDisposition::ContinueAndFail => {
                    let code = if previous_failures == 0 {
                        "token_required"
                    } else {
                        "invalid_credentials"
                    };
                    return Err(PlatformError::authentication(code, "portal sign-in failed"));
                }
            }
        }

        Err(PlatformError::authentication(
            "invalid_credentials",
            "portal sign-in failed",
        ))
    }
}

struct SimMap {
    info: MapInfo,
    load: SimOutcome,
    tables: Vec<Arc<SimFeatureTable>>,
    layers: Vec<LayerNode>,
}

impl SimMap {
    fn new(item_id: &str, scenario: &MapScenario) -> Self {
        let tables = scenario
            .tables
            .iter()
            .map(|t| Arc::new(SimFeatureTable::from_scenario(t)))
            .collect();
        let layers = scenario.layers.iter().map(build_layer).collect();

        Self {
            info: MapInfo {
                item_id: item_id.to_string(),
                title: scenario.title.clone(),
            },
            load: scenario.load.clone(),
            tables,
            layers,
        }
    }
}

fn build_layer(scenario: &LayerScenario) -> LayerNode {
    match scenario {
        LayerScenario::Feature { name, load } => {
            let mut table = SimFeatureTable::named(name);
            table.load = load.clone();
            LayerNode::Feature(Arc::new(SimFeatureLayer::new(table)))
        }
        LayerScenario::Group { name, children } => LayerNode::Group {
            name: name.clone(),
            children: children.iter().map(build_layer).collect(),
        },
    }
}

#[async_trait]
impl Map for SimMap {
    fn info(&self) -> MapInfo {
        self.info.clone()
    }

    async fn load(&self) -> Result<(), PlatformError> {
        self.load.clone().into_result("map")
    }

    fn tables(&self) -> Vec<Arc<dyn FeatureTable>> {
        self.tables
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn FeatureTable>)
            .collect()
    }

    fn operational_layers(&self) -> Vec<LayerNode> {
        self.layers.clone()
    }
}

/// The only `where` clause the simulated table evaluates.
const MATCH_ALL: &str = "1=1";

/// Simulated feature table. Queries support ordering and a row limit; any
/// filter other than `1=1` is rejected.
pub struct SimFeatureTable {
    name: String,
    status: Mutex<LoadStatus>,
    load: SimOutcome,
    query: SimOutcome,
    rows: Vec<Feature>,
    load_calls: AtomicUsize,
}

impl SimFeatureTable {
    /// A table that loads fine and has no rows.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: Mutex::new(LoadStatus::NotLoaded),
            load: SimOutcome::Ok,
            query: SimOutcome::Ok,
            rows: Vec::new(),
            load_calls: AtomicUsize::new(0),
        }
    }

    pub fn from_scenario(scenario: &TableScenario) -> Self {
        Self {
            load: scenario.load.clone(),
            query: scenario.query.clone(),
            rows: scenario.rows.clone(),
            ..Self::named(&scenario.name)
        }
    }

    /// Number of times `retry_load` ran.
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Loadable for SimFeatureTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_status(&self) -> LoadStatus {
        *self.status.lock()
    }

    async fn retry_load(&self) -> Result<(), PlatformError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.load.clone().into_result(&self.name);
        *self.status.lock() = if result.is_ok() {
            LoadStatus::Loaded
        } else {
            LoadStatus::Failed
        };
        result
    }
}

#[async_trait]
impl FeatureTable for SimFeatureTable {
    async fn query_features(
        &self,
        params: &QueryParameters,
    ) -> Result<FeatureSet, PlatformError> {
        self.query.clone().into_result(&self.name)?;
        if params.where_clause.trim() != MATCH_ALL {
            return Err(PlatformError::other(format!(
                "{}: unsupported where clause '{}'",
                self.name, params.where_clause
            )));
        }

        let mut features = self.rows.clone();
        for (field, order) in params.order_by.iter().rev() {
            features.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }
        if let Some(max) = params.max_features {
            features.truncate(max);
        }

        Ok(FeatureSet { features })
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => CmpOrdering::Greater,
        (None, Some(_)) => CmpOrdering::Less,
        _ => CmpOrdering::Equal,
    }
}

/// Simulated feature layer backed by a [`SimFeatureTable`].
pub struct SimFeatureLayer {
    table: Arc<SimFeatureTable>,
}

impl SimFeatureLayer {
    pub fn new(table: SimFeatureTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }
}

#[async_trait]
impl Loadable for SimFeatureLayer {
    fn name(&self) -> &str {
        self.table.name()
    }

    fn load_status(&self) -> LoadStatus {
        self.table.load_status()
    }

    async fn retry_load(&self) -> Result<(), PlatformError> {
        self.table.retry_load().await
    }
}

impl FeatureLayer for SimFeatureLayer {
    fn feature_table(&self) -> Arc<dyn FeatureTable> {
        Arc::clone(&self.table) as Arc<dyn FeatureTable>
    }
}

#[derive(Default)]
struct Subscribers {
    status: Option<mpsc::Sender<DataSourceStatus>>,
    location: Option<mpsc::Sender<LocationSample>>,
    running: Option<JoinHandle<()>>,
}

/// Simulated indoor location data source.
pub struct SimDataSource {
    scenario: DataSourceScenario,
    subscribers: Arc<Mutex<Subscribers>>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl SimDataSource {
    pub fn new(scenario: DataSourceScenario) -> Self {
        Self {
            scenario,
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Whether a started source is still producing statuses or samples.
    pub fn is_running(&self) -> bool {
        self.subscribers
            .lock()
            .running
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Whether anyone is still subscribed to the status stream.
    pub fn has_status_subscriber(&self) -> bool {
        self.subscribers
            .lock()
            .status
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Push a status to the current subscriber, as the platform would.
    pub async fn emit_status(&self, status: DataSourceStatus) {
        let tx = self.subscribers.lock().status.clone();
        send_status(tx.as_ref(), status).await;
    }

    /// Push a location sample to the current subscriber.
    pub async fn emit_sample(&self, sample: LocationSample) {
        let tx = self.subscribers.lock().location.clone();
        if let Some(tx) = tx {
            if tx.send(sample).await.is_err() {
                tracing::trace!("Sample dropped (subscriber gone)");
            }
        }
    }
}

async fn send_status(tx: Option<&mpsc::Sender<DataSourceStatus>>, status: DataSourceStatus) {
    if let Some(tx) = tx {
        if tx.send(status).await.is_err() {
            tracing::trace!(?status, "Status dropped (subscriber gone)");
        }
    }
}

#[async_trait]
impl IndoorsLocationDataSource for SimDataSource {
    async fn start(&self) -> Result<(), PlatformError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        if let StartOutcome::Error { message } = &self.scenario.start {
            return Err(PlatformError::other(message.clone()));
        }

        let (status_tx, location_tx) = {
            let subs = self.subscribers.lock();
            (subs.status.clone(), subs.location.clone())
        };
        send_status(status_tx.as_ref(), DataSourceStatus::Starting).await;

        let scenario = self.scenario.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(scenario.start_delay_ms)).await;

            if scenario.start == StartOutcome::FailedToStart {
                send_status(status_tx.as_ref(), DataSourceStatus::FailedToStart).await;
                return;
            }
            send_status(status_tx.as_ref(), DataSourceStatus::Started).await;

            let Some(location_tx) = location_tx else {
                return;
            };
            if scenario.samples.is_empty() {
                return;
            }
            let interval = Duration::from_millis(scenario.sample_interval_ms);
            loop {
                for sample in &scenario.samples {
                    tokio::time::sleep(interval).await;
                    if location_tx.send(sample.clone()).await.is_err() {
                        return;
                    }
                }
                if !scenario.repeat_samples {
                    return;
                }
            }
        });

        if let Some(previous) = self.subscribers.lock().running.replace(task) {
            previous.abort();
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), PlatformError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);

        let (status_tx, running) = {
            let mut subs = self.subscribers.lock();
            (subs.status.clone(), subs.running.take())
        };
        if let Some(running) = running {
            running.abort();
        }

        send_status(status_tx.as_ref(), DataSourceStatus::Stopping).await;
        send_status(status_tx.as_ref(), DataSourceStatus::Stopped).await;
        Ok(())
    }

    fn status_stream(&self) -> EventStream<DataSourceStatus> {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        self.subscribers.lock().status = Some(tx);
        rx
    }

    fn location_stream(&self) -> EventStream<LocationSample> {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        self.subscribers.lock().location = Some(tx);
        rx
    }
}

impl Drop for SimDataSource {
    fn drop(&mut self) {
        if let Some(running) = self.subscribers.lock().running.take() {
            running.abort();
        }
    }
}
