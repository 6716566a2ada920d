//! eventboard configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::error::{EventBoardError, EventBoardResult};

static DEFAULT_EVENTS_PATH: &str = "~/events/events.json";
pub const DEFAULT_SERVER_PORT: u16 = 4180;

fn default_events_path() -> PathBuf {
    PathBuf::from(DEFAULT_EVENTS_PATH)
}

fn default_dimensions() -> Vec<Dimension> {
    Dimension::ALL.to_vec()
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

/// Configuration at ~/.config/eventboard/config.toml, overridable with
/// `EVENTBOARD_*` environment variables (`EVENTBOARD_DIMENSIONS` is
/// comma-separated).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventBoardConfig {
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,

    /// Dimensions offered as filters
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<Dimension>,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

impl Default for EventBoardConfig {
    fn default() -> Self {
        EventBoardConfig {
            events_path: default_events_path(),
            dimensions: default_dimensions(),
            server_port: default_server_port(),
        }
    }
}

impl EventBoardConfig {
    pub fn config_path() -> EventBoardResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventBoardError::Config("Could not determine config directory".into()))?
            .join("eventboard");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented default file
    /// on first use.
    pub fn load() -> EventBoardResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from the default location without creating anything; a
    /// missing file yields the defaults.
    pub fn load_existing() -> EventBoardResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> EventBoardResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("EVENTBOARD")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("dimensions"),
            )
            .build()
            .map_err(|e| EventBoardError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventBoardError::Config(e.to_string()))
    }

    /// `events_path` with `~` expanded.
    pub fn events_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.events_path.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn save(&self, path: &Path) -> EventBoardResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| EventBoardError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| EventBoardError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventBoardResult<()> {
        let contents = format!(
            "\
# eventboard configuration

# Static JSON file with the event collection:
# events_path = \"{}\"

# Filters offered to visitors:
# dimensions = [\"location\", \"host\", \"topic\", \"access\", \"mode\", \"featured\", \"dates\"]

# Port for eventboard-server:
# server_port = {}
",
            DEFAULT_EVENTS_PATH, DEFAULT_SERVER_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventBoardError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventBoardError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
