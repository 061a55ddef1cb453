//! Application configuration for Sheetcast.
//!
//! User config lives at `~/.sheetcast/sheetcast.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SheetcastError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sheetcast.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sheetcast";

// ---------------------------------------------------------------------------
// Config structs (matching sheetcast.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider selection (production vs. test wiring).
    #[serde(default)]
    pub provider: ProviderConfig,

    /// External data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Object store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// `[provider]` section. Resolved once at process start into [`QueryConfig`]
/// and passed explicitly to the components that need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// "production" (default) or "test".
    #[serde(default = "default_provider_mode")]
    pub mode: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: default_provider_mode(),
        }
    }
}

fn default_provider_mode() -> String {
    "production".into()
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Production query endpoint.
    #[serde(default = "default_source_endpoint")]
    pub endpoint: String,

    /// Endpoint used when the provider mode is "test" (local mock).
    #[serde(default = "default_test_endpoint")]
    pub test_endpoint: String,

    /// Tenant/brand identifier sent as the `brandid` header.
    #[serde(default = "default_brand_id")]
    pub brand_id: String,

    /// HTTP timeout in seconds for query requests.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_source_endpoint(),
            test_endpoint: default_test_endpoint(),
            brand_id: default_brand_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_source_endpoint() -> String {
    "http://localhost:5050/health/chatbot".into()
}
fn default_test_endpoint() -> String {
    "http://localhost:5050/health/chatbot-test".into()
}
fn default_brand_id() -> String {
    "default".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Object store base endpoint. When unset, oversized payloads cannot be
    /// delivered and the offload step fails the transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// HTTP timeout in seconds for store puts.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Query config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for one query transaction — resolved once from the
/// config file (plus CLI overrides) at process start.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Resolved source endpoint (already provider-selected).
    pub source_endpoint: Url,
    /// Tenant/brand identifier header value.
    pub brand_id: String,
    /// Source request timeout in seconds.
    pub source_timeout_secs: u64,
    /// Object store endpoint, if configured.
    pub store_endpoint: Option<Url>,
    /// Store request timeout in seconds.
    pub store_timeout_secs: u64,
}

impl QueryConfig {
    /// Resolve the runtime config from an [`AppConfig`], selecting the source
    /// endpoint by provider mode and parsing endpoint URLs.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        let raw_endpoint = match config.provider.mode.as_str() {
            "production" => &config.source.endpoint,
            "test" => &config.source.test_endpoint,
            other => {
                return Err(SheetcastError::config(format!(
                    "unknown provider mode {other:?} (expected \"production\" or \"test\")"
                )));
            }
        };

        let source_endpoint = Url::parse(raw_endpoint).map_err(|e| {
            SheetcastError::config(format!("invalid source endpoint {raw_endpoint:?}: {e}"))
        })?;

        let store_endpoint = config
            .store
            .endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    SheetcastError::config(format!("invalid store endpoint {raw:?}: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            source_endpoint,
            brand_id: config.source.brand_id.clone(),
            source_timeout_secs: config.source.timeout_secs,
            store_endpoint,
            store_timeout_secs: config.store.timeout_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sheetcast/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SheetcastError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sheetcast/sheetcast.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SheetcastError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SheetcastError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SheetcastError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SheetcastError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SheetcastError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
