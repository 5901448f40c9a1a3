use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ConfigError;
use crate::session::ROUND_SECS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub round_secs: u32,
    pub word_count: usize,
    pub corpus: String,
    pub language: String,
    /// How long the event loop waits for input before redrawing
    pub tick_ms: u64,
    pub record_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            round_secs: ROUND_SECS,
            word_count: 30,
            corpus: "words".to_string(),
            language: "english".to_string(),
            tick_ms: 100,
            record_history: true,
        }
    }
}

pub trait ConfigStore {
    fn try_load(&self) -> Result<Config, ConfigError>;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;

    /// Persist `cfg` if it differs from what was loaded. Returns whether it wrote.
    fn update(&self, loaded: &Config, cfg: &Config) -> Result<bool, ConfigError> {
        if loaded == cfg {
            return Ok(false);
        }
        self.save(cfg)?;
        Ok(true)
    }

    /// Load, falling back to defaults when the file is missing or broken
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Config::default()
            }
            Err(err) => {
                warn!(%err, "using default config");
                Config::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typing-test") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typing_test_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(io_err)
    }
}
