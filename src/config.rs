use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

pub const MICROSOFT_API_KEY_ENV: &str = "MICROSOFT_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const GOOGLE_ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

/// Top-level configuration for labelbatch.
///
/// Holds provider credentials and endpoints plus the size and dimension
/// limits enforced before anything is sent. Resolved once at startup and
/// never mutated afterwards.
///
/// # Loading
///
/// ```rust,no_run
/// use labelbatch::config::Config;
///
/// // From a JSON file, then apply environment overrides
/// let mut config = Config::load(Some("config.json".as_ref())).unwrap();
/// config.apply_env();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.providers.microsoft.api_key = "0123abcd".into();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Credentials and endpoints for both services.
    pub providers: Providers,
    /// File size, batch size and dimension limits.
    pub limits: Limits,
    /// Per-request timeout in seconds. `None` keeps the transport default.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Providers {
    pub google: GoogleConfig,
    pub microsoft: MicrosoftConfig,
}

/// Google Cloud Vision (batch label detection).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// API key, sent as the `key` query parameter.
    pub api_key: String,
    /// OAuth access token, sent as a bearer token. Used when no API key is set.
    pub access_token: String,
    pub endpoint: String,
}

/// Microsoft Computer Vision (one image per request).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrosoftConfig {
    /// Subscription key, sent as `Ocp-Apim-Subscription-Key`.
    pub api_key: String,
    pub endpoint: String,
    pub visual_features: Vec<String>,
}

/// How the minimum-dimension rule compares width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DimensionCheck {
    /// Width against `min_width` and height against `min_height`.
    #[default]
    Strict,
    /// Width against both thresholds, height never checked. Matches the
    /// behaviour of earlier releases.
    Legacy,
}

/// Limits applied by the loader and packer.
///
/// Defaults follow the Cloud Vision best-practice guidance: 4 MB per image,
/// 8 MB per request, 640x480 minimum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_file_bytes: u64,
    pub max_batch_bytes: u64,
    pub min_width: u32,
    pub min_height: u32,
    pub dimension_check: DimensionCheck,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            access_token: String::new(),
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
        }
    }
}

impl Default for MicrosoftConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.projectoxford.ai/vision/v1.0/analyze".to_string(),
            visual_features: vec!["Description".to_string(), "Tags".to_string()],
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: 4 << 20,
            max_batch_bytes: 8 << 20,
            min_width: 640,
            min_height: 480,
            dimension_check: DimensionCheck::Strict,
        }
    }
}

impl Limits {
    /// Whether an image of `width` x `height` is below the minimum.
    pub fn is_too_small(&self, width: u32, height: u32) -> bool {
        match self.dimension_check {
            DimensionCheck::Strict => width < self.min_width || height < self.min_height,
            DimensionCheck::Legacy => width < self.min_width || width < self.min_height,
        }
    }
}

impl Config {
    /// Resolve the config file path next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Override credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(key) = non_empty(MICROSOFT_API_KEY_ENV) {
            self.providers.microsoft.api_key = key;
        }
        if let Some(key) = non_empty(GOOGLE_API_KEY_ENV) {
            self.providers.google.api_key = key;
        }
        if let Some(token) = non_empty(GOOGLE_ACCESS_TOKEN_ENV) {
            self.providers.google.access_token = token;
        }
    }
}

/// The service selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSelection {
    Google,
    Microsoft,
    /// Microsoft when a subscription key is configured, Google otherwise.
    Auto,
}

/// A concrete service, after `auto` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Microsoft,
}

impl FromStr for ProviderSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            "auto" => Ok(Self::Auto),
            _ => Err(ConfigError::InvalidProvider(s.to_string())),
        }
    }
}

impl ProviderSelection {
    pub fn resolve(self, config: &Config) -> Provider {
        match self {
            Self::Google => Provider::Google,
            Self::Microsoft => Provider::Microsoft,
            Self::Auto if !config.providers.microsoft.api_key.is_empty() => Provider::Microsoft,
            Self::Auto => Provider::Google,
        }
    }
}
