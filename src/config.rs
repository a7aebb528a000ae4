use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::session::{CustomParams, SessionOptions};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// level preselected on the level screen
    pub level: String,
    pub custom_digits: i64,
    pub custom_seconds: f64,
    pub countdown: bool,
    pub auto_advance_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "easy".to_string(),
            custom_digits: 3,
            custom_seconds: 2.0,
            countdown: true,
            auto_advance_ms: None,
        }
    }
}

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub level: Option<String>,
    pub custom_digits: Option<i64>,
    pub custom_seconds: Option<f64>,
    pub no_countdown: bool,
    pub auto_advance_ms: Option<u64>,
    pub seed: Option<u64>,
}

/// Effective settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub level: String,
    pub custom: CustomParams,
    pub countdown: bool,
    pub auto_advance: Option<Duration>,
    pub seed: Option<u64>,
}

impl Settings {
    pub fn merge(config: &Config, overrides: &Overrides) -> Self {
        Self {
            level: overrides
                .level
                .clone()
                .unwrap_or_else(|| config.level.clone()),
            custom: CustomParams {
                digits: overrides.custom_digits.unwrap_or(config.custom_digits),
                seconds: overrides.custom_seconds.unwrap_or(config.custom_seconds),
            },
            countdown: config.countdown && !overrides.no_countdown,
            auto_advance: overrides
                .auto_advance_ms
                .or(config.auto_advance_ms)
                .map(Duration::from_millis),
            seed: overrides.seed,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            countdown: self.countdown,
            auto_advance: self.auto_advance,
            seed: self.seed,
        }
    }
}

impl From<&Settings> for Config {
    fn from(s: &Settings) -> Self {
        Self {
            level: s.level.clone(),
            custom_digits: s.custom.digits,
            custom_seconds: s.custom.seconds,
            countdown: s.countdown,
            auto_advance_ms: s.auto_advance.map(|d| d.as_millis() as u64),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "soroban-flash") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("soroban_flash_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Like [`ConfigStore::load`] but reports why the file could not be used.
    pub fn try_load(&self) -> Result<Config> {
        let bytes = fs::read(&self.path).map_err(|e| AppError::io(&self.path, e))?;
        serde_json::from_slice::<Config>(&bytes).map_err(|source| AppError::Config {
            path: self.path.clone(),
            source,
        })
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => {
                debug!(path = %self.path.display(), "loaded config");
                cfg
            }
            Err(AppError::Io { ref source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Config::default()
            }
            Err(e) => {
                warn!(error = %e, "using default config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(|source| AppError::Config {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(|e| AppError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            level: "hard".into(),
            custom_digits: 5,
            custom_seconds: 0.75,
            countdown: false,
            auto_advance_ms: Some(1000),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
        assert_matches!(store.try_load(), Err(AppError::Io { .. }));
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
        assert_matches!(store.try_load(), Err(AppError::Config { .. }));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "level": "normal" }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.level, "normal");
        assert_eq!(cfg.custom_digits, 3);
        assert!(cfg.countdown);
    }

    #[test]
    fn overrides_take_precedence() {
        let cfg = Config {
            auto_advance_ms: Some(2000),
            ..Config::default()
        };
        let overrides = Overrides {
            level: Some("hard".into()),
            custom_seconds: Some(1.5),
            no_countdown: true,
            seed: Some(9),
            ..Overrides::default()
        };
        let settings = Settings::merge(&cfg, &overrides);

        assert_eq!(settings.level, "hard");
        assert_eq!(settings.custom.digits, 3);
        assert_eq!(settings.custom.seconds, 1.5);
        assert!(!settings.countdown);
        assert_eq!(settings.auto_advance, Some(Duration::from_millis(2000)));

        let options = settings.session_options();
        assert_eq!(options.seed, Some(9));
        assert!(!options.countdown);
    }

    #[test]
    fn settings_convert_back_to_config() {
        let settings = Settings::merge(&Config::default(), &Overrides::default());
        assert_eq!(Config::from(&settings), Config::default());
    }
}
