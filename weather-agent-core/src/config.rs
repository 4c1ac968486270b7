use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

/// Environment variable holding the shared geocoding/weather API key.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

pub const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_WEATHER_URL: &str = "https://weather.googleapis.com/v1/currentConditions:lookup";
pub const DEFAULT_LANGUAGE: &str = "ja";

pub const DEFAULT_AGENT_NAME: &str = "root_agent";
pub const DEFAULT_AGENT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_AGENT_INSTRUCTION: &str = "あなたは親切なアシスタントです。ユーザーが聞いた地域の天気やについて、できるだけ柔軟に対応してください。「カリフォルニア」「日本」「アメリカ」のような大きな地域名でも、その地域の代表的な場所の情報を提供してください。";

/// How the agent hosting the tool is described to the conversational runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub name: String,
    pub model: String,
    pub instruction: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            model: DEFAULT_AGENT_MODEL.to_string(),
            instruction: DEFAULT_AGENT_INSTRUCTION.to_string(),
        }
    }
}

/// Top-level configuration, built once and handed to the resolver and the lookup.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// language = "ja"
///
/// [agent]
/// model = "gemini-2.0-flash"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shared key for both the geocoding and the weather endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Response language requested from the geocoder.
    pub language: String,

    pub geocoding_url: String,
    pub weather_url: String,

    /// Request timeout; when absent the HTTP client default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    pub agent: AgentSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            language: DEFAULT_LANGUAGE.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            timeout_secs: None,
            agent: AgentSettings::default(),
        }
    }
}

impl Config {
    /// Returns the API key, treating an empty string as not configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key).filter(|k| !k.is_empty());
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build an HTTP client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to build HTTP client")
    }

    /// Overlay values taken from an environment-like lookup.
    ///
    /// An empty `WEATHER_API_KEY` is ignored, leaving the file value in place.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Load the config file and apply overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::load()?.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-agent", "weather-agent")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
