use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{from_slice, to_string_pretty};
use strum::IntoEnumIterator;
use url::Url;

use super::types::{Context, CoverageStatus};
use crate::error::Error;

const CONFIG_PATH: &str = "config.json";
const DEFAULT_API_URL: &str = "http://localhost:5050/";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStatusOption {
    pub enabled: bool,
    pub option_label: String,
    pub button_label: String,
}

/// Which coverage statuses the agenda filter offers, and their labels
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageStatusFilterConfig(pub BTreeMap<CoverageStatus, CoverageStatusOption>);

impl Default for CoverageStatusFilterConfig {
    fn default() -> Self {
        let options = CoverageStatus::iter()
            .map(|status| {
                let (option_label, button_label) = match status {
                    CoverageStatus::Planned => ("Coverage is planned", "Planned"),
                    CoverageStatus::MayBe => ("Coverage may be planned", "May be"),
                    CoverageStatus::NotIntended => ("Coverage not intended", "Not intended"),
                    CoverageStatus::NotPlanned => ("Coverage not planned", "Not planned"),
                    CoverageStatus::Completed => ("Coverage completed", "Completed"),
                };
                (
                    status,
                    CoverageStatusOption {
                        enabled: true,
                        option_label: crate::loc!(option_label).to_string(),
                        button_label: crate::loc!(button_label).to_string(),
                    },
                )
            })
            .collect();
        Self(options)
    }
}

impl CoverageStatusFilterConfig {
    /// Enabled options, in display order
    pub fn enabled_options(&self) -> Vec<CoverageStatus> {
        CoverageStatus::iter()
            .filter(|status| self.0.get(status).is_some_and(|o| o.enabled))
            .collect()
    }

    pub fn get(&self, status: CoverageStatus) -> Option<&CoverageStatusOption> {
        self.0.get(&status)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base of every API path
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// Used when `RUST_LOG` isn't set
    pub log_filter: String,
    pub default_context: Context,
    pub coverage_status_filter: CoverageStatusFilterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
            default_context: Context::default(),
            coverage_status_filter: CoverageStatusFilterConfig::default(),
        }
    }
}

impl Config {
    /// The API url, always ending in `/` so relative paths join below it
    pub fn api_base(&self) -> Result<Url, Error> {
        let mut raw = self.api_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }
}

/// Loads and saves the client configuration as JSON
#[derive(Clone)]
pub struct Repository {
    path: PathBuf,
    config: Arc<Mutex<Config>>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .finish()
    }
}

impl Repository {
    /// The configuration in the platform config directory
    pub fn new() -> Result<Self, Error> {
        Self::at(data_directory()?.join(CONFIG_PATH))
    }

    /// The configuration at `path`. A missing file yields the defaults.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let config = read(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            config: Arc::new(Mutex::new(config)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> Result<Config, Error> {
        Ok(self.lock()?.clone())
    }

    pub fn set_config(&self, config: &Config) -> Result<(), Error> {
        let mut current = self.lock()?;
        *current = config.clone();
        write(&self.path, current.deref())
    }

    pub fn map_config<T>(&self, action: impl FnOnce(&mut Config) -> T) -> Result<T, Error> {
        let mut config = self.lock()?;
        let o = action(&mut config);
        write(&self.path, config.deref())?;
        Ok(o)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Config>, Error> {
        self.config
            .lock()
            .map_err(|e| Error::Storage(format!("{e:?}")))
    }
}

fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, Error> {
    if !path.exists() {
        return Ok(None);
    };
    let data = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let obj: T = from_slice(&data).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(obj))
}

fn write<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let data = to_string_pretty(&value).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn data_directory() -> Result<PathBuf, Error> {
    use directories_next::ProjectDirs;
    let proj_dirs =
        ProjectDirs::from("com", "newshub", "newshub-client").ok_or(Error::NoConfigDirectory)?;
    let dirs = proj_dirs.config_dir().to_path_buf();
    if !dirs.exists() {
        std::fs::create_dir_all(&dirs).map_err(|source| {
            log::error!("Could not create directory {}: {source:?}", dirs.display());
            Error::Io {
                path: dirs.clone(),
                source,
            }
        })?;
    }
    Ok(dirs)
}
