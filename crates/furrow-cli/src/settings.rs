//! Layered configuration: defaults, then an optional TOML file, then
//! `FURROW_*` environment variables. Command-line flags are applied on top by
//! the caller.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Environment variable the source program used for the API key.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite file holding the planting history and feedback logs.
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Location used when a command is given none.
  #[serde(default = "default_location")]
  pub default_location: String,
  /// Alternative rule table (same JSON shape as the built-in one).
  #[serde(default)]
  pub rules_path:       Option<PathBuf>,
  #[serde(default)]
  pub weather:          WeatherSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSettings {
  #[serde(default)]
  pub api_key:      Option<String>,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for WeatherSettings {
  fn default() -> Self {
    Self {
      api_key:      None,
      base_url:     default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/furrow/furrow.db") }

fn default_location() -> String { "Delhi".to_owned() }

fn default_base_url() -> String { "https://api.openweathermap.org".to_owned() }

fn default_timeout_secs() -> u64 { 10 }

impl Settings {
  /// Read `path` (if it exists) and overlay `FURROW_*` variables, using `__`
  /// to reach nested keys (e.g. `FURROW_WEATHER__API_KEY`).
  pub fn load(path: &Path) -> anyhow::Result<Self> { Self::load_with_env(path, None) }

  /// As [`Settings::load`], reading `FURROW_*` variables from `env` instead of
  /// the process environment when given.
  pub fn load_with_env(
    path: &Path,
    env: Option<config::Map<String, String>>,
  ) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("FURROW")
          .prefix_separator("_")
          .separator("__")
          .source(env),
      )
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise settings")?;

    if settings.weather.api_key.is_none() {
      settings.weather.api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty());
    }
    settings.store_path = expand_tilde(&settings.store_path);
    settings.rules_path = settings.rules_path.as_deref().map(expand_tilde);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
