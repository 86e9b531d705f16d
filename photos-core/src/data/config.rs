use std::{
    env::{self, VarError},
    fs::File,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

use crate::error::Error;

const APP_NAME: &str = "Photos";
const CONFIG_FILENAME: &str = "config.json";
const PROXY_ENV_VAR: &str = "HTTPS_PROXY";

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const WIDE_PAGE_SIZE: usize = 50;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Photos requested per list fetch.
    pub page_size: usize,
    /// Quiet period before search input turns into a request.
    pub search_debounce_ms: u64,
    pub worker_threads: usize,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: 400,
            worker_threads: 4,
            timeout_secs: 5,
        }
    }
}

impl Config {
    /// Switches to the page size for wide viewports, where a page of ten
    /// leaves the grid mostly empty.  Other settings are kept.
    pub fn wide(self) -> Self {
        Self {
            page_size: WIDE_PAGE_SIZE,
            ..self
        }
    }

    fn app_dirs() -> Option<AppDirs> {
        const USE_XDG_ON_MACOS: bool = false;

        AppDirs::new(Some(APP_NAME), USE_XDG_ON_MACOS)
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.config_dir)
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    /// Loads the config from the platform config directory, falling back to
    /// defaults when it is missing or unreadable.
    pub fn load() -> Config {
        let Some(path) = Self::config_path() else {
            log::warn!("no config directory available, using defaults");
            return Config::default();
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(err) => {
                log::error!("failed to read config {:?}: {}", path, err);
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Config>, Error> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::ConfigError(err.to_string())),
        };
        log::info!("loading config: {:?}", path);
        let config: Config = serde_json::from_reader(file)
            .map_err(|err| Error::ConfigError(err.to_string()))?;
        config.validate()?;
        Ok(Some(config))
    }

    fn validate(&self) -> Result<(), Error> {
        if self.page_size == 0 {
            return Err(Error::ConfigError("page_size must be positive".into()));
        }
        if self.worker_threads == 0 {
            return Err(Error::ConfigError(
                "worker_threads must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn proxy() -> Option<String> {
        env::var(PROXY_ENV_VAR).map_or_else(
            |err| match err {
                VarError::NotPresent => None,
                VarError::NotUnicode(_) => {
                    log::error!("proxy URL is not a valid unicode");
                    None
                }
            },
            Some,
        )
    }
}
