use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub positioning: PositioningConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the map is hosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal base URL.
    #[serde(default = "default_portal_url")]
    pub url: String,
    /// Item id of the web map to open.
    #[serde(default = "default_map_item_id")]
    pub map_item_id: String,
}

/// Names and options used to set up indoor positioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositioningConfig {
    /// Name of the positioning table in the map (default: "IPS_Positioning").
    #[serde(default = "default_table_name")]
    pub table_name: String,
    /// Name of the pathways feature layer (default: "Pathways").
    #[serde(default = "default_pathways_layer_name")]
    pub pathways_layer_name: String,
    /// Field used to pick the newest positioning row (default: "DATE_CREATED").
    #[serde(default = "default_order_by_field")]
    pub order_by_field: String,
    /// Field holding the positioning id (default: "GlobalID").
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Start the data source as soon as it is constructed (default: true).
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

/// Credentials answered to portal authentication challenges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Username. No credentials are offered when unset.
    #[serde(default)]
    pub username: Option<String>,
    /// Password given inline. Prefer `password_env`.
    #[serde(default)]
    pub password: Option<String>,
    /// Environment variable holding the password (default: "INDOORVIEW_PASSWORD").
    #[serde(default = "default_password_env")]
    pub password_env: String,
    /// How many rejected attempts before giving up on a challenge (default: 1).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_portal_url() -> String {
    "sim://portal".to_string()
}

fn default_map_item_id() -> String {
    "indoor-demo".to_string()
}

fn default_table_name() -> String {
    "IPS_Positioning".to_string()
}

fn default_pathways_layer_name() -> String {
    "Pathways".to_string()
}

fn default_order_by_field() -> String {
    "DATE_CREATED".to_string()
}

fn default_id_field() -> String {
    "GlobalID".to_string()
}

fn default_auto_start() -> bool {
    true
}

fn default_password_env() -> String {
    "INDOORVIEW_PASSWORD".to_string()
}

fn default_max_attempts() -> u32 {
    1
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            url: default_portal_url(),
            map_item_id: default_map_item_id(),
        }
    }
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            pathways_layer_name: default_pathways_layer_name(),
            order_by_field: default_order_by_field(),
            id_field: default_id_field(),
            auto_start: default_auto_start(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            password_env: default_password_env(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
