//! Application-level configuration loading: session timing, team capacity and
//! the optional seed fixture for the in-memory store.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_NIGHT_BACK_CONFIG_PATH";

const DEFAULT_AUTO_REVEAL_GRACE_MS: u64 = 2_000;
const DEFAULT_TRANSITION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SESSION_COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    auto_reveal_grace_ms: u64,
    default_auto_advance: bool,
    transition_timeout_ms: u64,
    session_command_buffer: usize,
    default_team_capacity: Option<u32>,
    seed_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        grace_ms = app_config.auto_reveal_grace_ms,
                        auto_advance = app_config.default_auto_advance,
                        "loaded config"
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

    /// Delay between an expired countdown and the automatic reveal.
    pub fn auto_reveal_grace(&self) -> Duration {
        Duration::from_millis(self.auto_reveal_grace_ms)
    }

    /// Auto-advance preference of newly opened sessions.
    pub fn default_auto_advance(&self) -> bool {
        self.default_auto_advance
    }

    /// Upper bound on storage work performed inside a session transition.
    pub fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_timeout_ms)
    }

    /// Capacity of each session's command channel.
    pub fn session_command_buffer(&self) -> usize {
        self.session_command_buffer
    }

    /// Team size limit applied when a team does not declare its own.
    pub fn default_team_capacity(&self) -> Option<u32> {
        self.default_team_capacity
    }

    /// JSON fixture used to seed the in-memory store, if any.
    pub fn seed_path(&self) -> Option<&PathBuf> {
        self.seed_path.as_ref()
    }

    /// Override the team capacity; mostly useful in tests.
    pub fn with_default_team_capacity(mut self, capacity: Option<u32>) -> Self {
        self.default_team_capacity = capacity;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    auto_reveal_grace_ms: u64,
    default_auto_advance: bool,
    transition_timeout_ms: u64,
    session_command_buffer: usize,
    default_team_capacity: Option<u32>,
    seed_path: Option<PathBuf>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            auto_reveal_grace_ms: DEFAULT_AUTO_REVEAL_GRACE_MS,
            default_auto_advance: false,
            transition_timeout_ms: DEFAULT_TRANSITION_TIMEOUT_MS,
            session_command_buffer: DEFAULT_SESSION_COMMAND_BUFFER,
            default_team_capacity: None,
            seed_path: None,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            auto_reveal_grace_ms: value.auto_reveal_grace_ms,
            default_auto_advance: value.default_auto_advance,
            transition_timeout_ms: value.transition_timeout_ms,
            session_command_buffer: value.session_command_buffer.max(1),
            default_team_capacity: value.default_team_capacity,
            seed_path: value.seed_path.filter(|path| !path.as_os_str().is_empty()),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "default_auto_advance": true, "seed_path": "" }"#).unwrap();
        let config: AppConfig = raw.into();

        assert!(config.default_auto_advance());
        assert_eq!(config.auto_reveal_grace(), Duration::from_secs(2));
        assert_eq!(config.transition_timeout(), Duration::from_secs(5));
        assert!(config.seed_path().is_none());
    }

    #[test]
    fn command_buffer_is_never_zero() {
        let raw: RawConfig = serde_json::from_str(r#"{ "session_command_buffer": 0 }"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.session_command_buffer(), 1);
    }
}
