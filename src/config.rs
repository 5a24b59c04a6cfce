//! Configuration resolution.
//!
//! Settings come from stacked [`ConfigLayer`]s: command-line overrides first,
//! then the process environment (after `.env` loading), then the per-user TOML
//! file. Model and temperature fall back to built-in defaults; the API key has
//! no default.

use crate::error::{GlimpseError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.4;
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_VAR: &str = "OPENROUTER_LLM";
pub const TEMPERATURE_VAR: &str = "OPENROUTER_TEMPERATURE";
pub const BASE_URL_VAR: &str = "OPENROUTER_BASE_URL";
pub const TIMEOUT_VAR: &str = "OPENROUTER_TIMEOUT_SECS";
pub const CONFIG_PATH_VAR: &str = "GLIMPSE_CONFIG";

/// One source of raw, unvalidated configuration values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    openrouter: FileSection,
}

#[derive(Debug, Default, Deserialize)]
struct FileSection {
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<toml::Value>,
}

impl ConfigLayer {
    /// Build a layer from an environment-style lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: non_empty(lookup(API_KEY_VAR)),
            model: non_empty(lookup(MODEL_VAR)),
            temperature: non_empty(lookup(TEMPERATURE_VAR)),
        }
    }

    /// Build a layer from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse the `[openrouter]` section of a TOML config document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| GlimpseError::Config(format!("cannot parse config file: {}", e)))?;
        let section = file.openrouter;

        let temperature = match section.temperature {
            None => None,
            Some(toml::Value::Float(f)) => Some(f.to_string()),
            Some(toml::Value::Integer(i)) => Some(i.to_string()),
            Some(toml::Value::String(s)) => Some(s),
            Some(other) => {
                return Err(GlimpseError::Config(format!(
                    "temperature in config file must be a number, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            api_key: non_empty(section.api_key),
            model: non_empty(section.model),
            temperature: non_empty(temperature),
        })
    }

    /// Read a config file. A file that does not exist yields an empty layer.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file found");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            GlimpseError::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&contents)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Location of the per-user config file for the given environment.
pub fn config_file_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = non_empty(lookup(CONFIG_PATH_VAR)) {
        return Some(PathBuf::from(path));
    }
    if let Some(dir) = non_empty(lookup("XDG_CONFIG_HOME")) {
        return Some(PathBuf::from(dir).join("glimpse").join("config.toml"));
    }
    non_empty(lookup("HOME"))
        .map(|home| PathBuf::from(home).join(".config").join("glimpse").join("config.toml"))
}

/// Parse and range-check a temperature value.
pub fn parse_temperature(raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        GlimpseError::Config(format!("temperature must be a number, got '{}'", raw))
    })?;

    if !(0.0..=1.0).contains(&value) {
        return Err(GlimpseError::Config(format!(
            "temperature must be between 0.0 and 1.0, got {}",
            value
        )));
    }

    Ok(value)
}

/// Fully resolved settings for a single request.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Settings {
    /// Resolve settings from layers ordered highest precedence first.
    pub fn resolve(layers: &[ConfigLayer]) -> Result<Self> {
        let api_key = layers.iter().find_map(|l| l.api_key.clone()).ok_or_else(|| {
            GlimpseError::Config(format!(
                "no API key found. Set {} in the environment, a .env file or the config file",
                API_KEY_VAR
            ))
        })?;

        let model = layers
            .iter()
            .find_map(|l| l.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match layers.iter().find_map(|l| l.temperature.as_deref()) {
            Some(raw) => parse_temperature(raw)?,
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            api_key,
            model,
            temperature,
        })
    }
}

/// Configuration layers below the command line: the process environment
/// (after `.env` loading) followed by the per-user config file.
pub fn ambient_layers() -> Result<Vec<ConfigLayer>> {
    match dotenv::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => debug!(error = %e, "No .env file loaded"),
    }

    let env = ConfigLayer::from_env();
    let file = match config_file_path(|key| std::env::var(key).ok()) {
        Some(path) => ConfigLayer::from_file(&path)?,
        None => ConfigLayer::default(),
    };

    Ok(vec![env, file])
}

/// Where and how long to talk to the API.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EndpointConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = non_empty(lookup(BASE_URL_VAR))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match non_empty(lookup(TIMEOUT_VAR)) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    GlimpseError::Config(format!(
                        "{} must be a whole number of seconds, got '{}'",
                        TIMEOUT_VAR, raw
                    ))
                })?;
                if secs == 0 {
                    return Err(GlimpseError::Config(format!(
                        "{} must be greater than zero",
                        TIMEOUT_VAR
                    )));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, timeout })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}
