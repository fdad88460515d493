use crate::error::{ProvisionError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Configuration file picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "campaign-provisioner.toml";

/// Environment variables understood without the `PROVISIONER__` prefix
const LEGACY_ENV_VARS: [(&str, &str); 3] = [
    ("tracker.entrypoint", "TRACKER_ENTRYPOINT"),
    ("tracker.api_key", "TRACKER_API_KEY"),
    ("access.user_id", "USER_ID_FOR_OPEN_ACCESS"),
];

/// Main configuration structure for the campaign provisioner
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvisionerConfig {
    /// Tracker connection settings
    pub tracker: TrackerConfig,
    /// Permission granting settings
    pub access: AccessConfig,
    /// Fixed lookups performed against tracker listings
    pub selection: SelectionConfig,
    /// Where the landing content is downloaded from
    pub source: SourceConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Tracker base URL (TRACKER_ENTRYPOINT)
    pub entrypoint: Option<String>,
    /// Tracker API key (TRACKER_API_KEY)
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Maximum redirects followed per request
    pub max_redirects: usize,
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("entrypoint", &self.entrypoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessConfig {
    /// User that receives modify access on the new campaign and landing (USER_ID_FOR_OPEN_ACCESS)
    #[serde(default, deserialize_with = "strict_user_id")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Name of the traffic source every campaign is attached to
    pub traffic_source_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// URL the landing content is fetched from, `{domain}` is substituted
    pub page_url_template: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human readable ones
    pub json_logs: bool,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig {
                entrypoint: None,
                api_key: None,
                timeout_seconds: 30,
                max_redirects: 10,
            },
            access: AccessConfig { user_id: None },
            selection: SelectionConfig {
                traffic_source_name: "GA".to_string(),
            },
            source: SourceConfig {
                page_url_template: "https://{domain}".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

/// Validated tracker connection settings handed to the client
#[derive(Clone)]
pub struct TrackerSettings {
    pub entrypoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl fmt::Debug for TrackerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerSettings")
            .field("entrypoint", &self.entrypoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

impl ProvisionerConfig {
    /// Load configuration from the process environment.
    ///
    /// Precedence, lowest first:
    /// 1. Default values
    /// 2. Configuration file (`path`, or campaign-provisioner.toml if present)
    /// 3. Environment variables prefixed with `PROVISIONER__`
    /// 4. TRACKER_ENTRYPOINT, TRACKER_API_KEY, USER_ID_FOR_OPEN_ACCESS
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Same as [`ProvisionerConfig::load`] with the legacy variables read through `lookup`
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_from(path, None, lookup)
    }

    /// `prefixed` replaces the process environment as the source of `PROVISIONER__*` values
    fn load_from<F>(
        path: Option<&Path>,
        prefixed: Option<config::Map<String, String>>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder =
            Config::builder().add_source(Config::try_from(&Self::default()).map_err(config_error)?);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        // Values stay strings; numeric fields are converted on deserialization
        builder = builder.add_source(
            Environment::with_prefix("PROVISIONER")
                .separator("__")
                .source(prefixed),
        );

        for (key, var) in LEGACY_ENV_VARS {
            // Empty values count as unset
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                builder = builder
                    .set_override(key, value.trim().to_string())
                    .map_err(config_error)?;
            }
        }

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(config_error)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()
                .map_err(|e| ProvisionError::Configuration(format!("failed to read .env: {e}")))?;
        }
        Ok(())
    }

    /// Check that the tracker entrypoint and API key are present
    pub fn tracker_settings(&self) -> Result<TrackerSettings> {
        let entrypoint = non_blank(self.tracker.entrypoint.as_deref()).ok_or_else(|| {
            ProvisionError::Configuration("tracker entrypoint is not set (TRACKER_ENTRYPOINT)".into())
        })?;
        let api_key = non_blank(self.tracker.api_key.as_deref()).ok_or_else(|| {
            ProvisionError::Configuration("tracker API key is not set (TRACKER_API_KEY)".into())
        })?;

        Ok(TrackerSettings {
            entrypoint: entrypoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(self.tracker.timeout_seconds),
            max_redirects: self.tracker.max_redirects,
        })
    }

    /// User to grant access to, only when a positive id is configured
    pub fn grant_user_id(&self) -> Option<u64> {
        self.access
            .user_id
            .filter(|id| *id > 0)
            .and_then(|id| u64::try_from(id).ok())
    }
}

/// Accept integers and integer strings only. `config` would otherwise read
/// "true", "yes" or "on" as user 1.
fn strict_user_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Number(i64),
        Text(String),
    }

    match Option::<RawUserId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawUserId::Number(id)) => Ok(Some(id)),
        Some(RawUserId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawUserId::Text(text)) => text.trim().parse().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("user id {text:?} is not an integer"))
        }),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn config_error(err: config::ConfigError) -> ProvisionError {
    ProvisionError::Configuration(format!("failed to load configuration: {err}"))
}
