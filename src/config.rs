//! Application-level configuration loading, including the scheduler cadence
//! and the bounds applied to player-supplied game settings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CAPTION_CLASH_CONFIG_PATH";

/// Period of the scheduler loop when the configuration does not set one.
const DEFAULT_TICK_INTERVAL_MS: u64 = 200;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Period between two scheduler passes over the live games.
    pub tick_interval: Duration,
    /// Bounds applied to player-supplied game settings.
    pub limits: SettingsLimits,
}

#[derive(Debug, Clone)]
/// Validation bounds for [`crate::state::game::GameSettings`] values.
pub struct SettingsLimits {
    /// Largest lobby capacity a master may configure.
    pub max_players: usize,
    /// Largest round count a master may configure.
    pub max_rounds: u32,
    /// Shortest allowed suggestion/voting window, in seconds.
    pub min_window_secs: u64,
    /// Longest allowed suggestion/voting window, in seconds.
    pub max_window_secs: u64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        tick_ms = app_config.tick_interval.as_millis() as u64,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            limits: SettingsLimits::default(),
        }
    }
}

impl Default for SettingsLimits {
    fn default() -> Self {
        Self {
            max_players: 12,
            max_rounds: 16,
            min_window_secs: 5,
            max_window_secs: 300,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    tick_interval_ms: Option<u64>,
    max_players: Option<usize>,
    max_rounds: Option<u32>,
    min_window_secs: Option<u64>,
    max_window_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = SettingsLimits::default();
        Self {
            tick_interval: Duration::from_millis(
                value.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS),
            ),
            limits: SettingsLimits {
                max_players: value.max_players.unwrap_or(defaults.max_players),
                max_rounds: value.max_rounds.unwrap_or(defaults.max_rounds),
                min_window_secs: value.min_window_secs.unwrap_or(defaults.min_window_secs),
                max_window_secs: value.max_window_secs.unwrap_or(defaults.max_window_secs),
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
