//! Deployment settings loaded from a TOML file.
//!
//! Every section and every key is optional:
//!
//! ```toml
//! [primary]
//! external = "/external_MQQC_database/list_collect.sqlite"
//! working = "data/list_collect.sqlite"
//! marker = "external_MQQC_database"
//!
//! [metadata]
//! external = "/external_Meta_database/Metadata.sqlite"
//! working = "data/Metadata.sqlite"
//! marker = "external_Meta_database"
//!
//! [processing]
//! output_dir = "csvFiles"
//! polling_interval_secs = 60
//! monitor_days = 30
//! retention_days = 1
//! sweep_interval_secs = 86400
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pqc_db::default_primary_columns;
use pqc_model::{DatabaseKind, WatchedDatabase};
use pqc_sync::SyncSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pqc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub primary: DatabaseConfig,
    pub metadata: DatabaseConfig,
    pub processing: ProcessingConfig,
}

/// One watched database. Unset keys fall back to the defaults of its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub external: Option<PathBuf>,
    pub working: Option<PathBuf>,
    pub marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    pub output_dir: PathBuf,
    pub polling_interval_secs: u64,
    /// Days a project stays active after its latest sample.
    pub monitor_days: u32,
    /// Age in days after which an inactive project's snapshot is deleted.
    pub retention_days: u32,
    pub sweep_interval_secs: u64,
    /// Primary table columns to export; empty exports all of them.
    pub primary_columns: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("csvFiles"),
            polling_interval_secs: 60,
            monitor_days: 30,
            retention_days: 1,
            sweep_interval_secs: 24 * 60 * 60,
            primary_columns: default_primary_columns(),
        }
    }
}

struct KindDefaults {
    external: &'static str,
    working: &'static str,
    marker: &'static str,
}

const fn kind_defaults(kind: DatabaseKind) -> KindDefaults {
    match kind {
        DatabaseKind::Primary => KindDefaults {
            external: "/external_MQQC_database/list_collect.sqlite",
            working: "data/list_collect.sqlite",
            marker: "external_MQQC_database",
        },
        DatabaseKind::Metadata => KindDefaults {
            external: "/external_Meta_database/Metadata.sqlite",
            working: "data/Metadata.sqlite",
            marker: "external_Meta_database",
        },
    }
}

impl DatabaseConfig {
    /// Fills unset keys with the defaults for `kind`.
    ///
    /// Without an explicit marker, an overridden external path is its own
    /// marker; only the default mount keeps the default marker.
    pub fn resolve(&self, kind: DatabaseKind) -> WatchedDatabase {
        let defaults = kind_defaults(kind);
        let working = self
            .working
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults.working));
        match (&self.external, &self.marker) {
            (Some(external), None) => WatchedDatabase::new(kind, external.clone(), working),
            (external, marker) => {
                let external = external
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(defaults.external));
                let marker = marker
                    .clone()
                    .unwrap_or_else(|| defaults.marker.to_string());
                WatchedDatabase::new(kind, external, working).with_marker(marker)
            }
        }
    }

    fn rebase(&mut self, base: &Path) {
        for path in [&mut self.external, &mut self.working].into_iter().flatten() {
            *path = rebase_path(base, path);
        }
    }
}

impl Settings {
    /// Parses settings from TOML text without touching relative paths.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads `path`, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml(&content, path)?;
        if let Some(base) = path.parent() {
            settings.rebase(base);
        }
        Ok(settings)
    }

    /// Loads the explicit config file, or the default one if it exists.
    ///
    /// A missing default file yields the built-in settings; a missing
    /// explicit file is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load(path)
                } else {
                    tracing::debug!(path = DEFAULT_CONFIG_FILE, "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.polling_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "processing.polling_interval_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if self.processing.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "processing.sweep_interval_secs",
                message: "must be at least 1".to_string(),
            });
        }
        let primary = self.primary.resolve(DatabaseKind::Primary);
        let metadata = self.metadata.resolve(DatabaseKind::Metadata);
        if primary.external == metadata.external {
            return Err(ConfigError::Invalid {
                key: "metadata.external",
                message: "must differ from primary.external".to_string(),
            });
        }
        for (key, database) in [("primary.marker", &primary), ("metadata.marker", &metadata)] {
            if database.marker.is_empty() {
                return Err(ConfigError::Invalid {
                    key,
                    message: "must not be empty".to_string(),
                });
            }
            if !database.owns(&database.external) {
                return Err(ConfigError::Invalid {
                    key,
                    message: format!(
                        "`{}` does not occur in {}",
                        database.marker,
                        database.external.display()
                    ),
                });
            }
        }
        Ok(())
    }

    fn rebase(&mut self, base: &Path) {
        self.primary.rebase(base);
        self.metadata.rebase(base);
        self.processing.output_dir = rebase_path(base, &self.processing.output_dir);
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.processing.polling_interval_secs)
    }

    pub fn primary(&self) -> WatchedDatabase {
        self.primary.resolve(DatabaseKind::Primary)
    }

    pub fn metadata(&self) -> WatchedDatabase {
        self.metadata.resolve(DatabaseKind::Metadata)
    }

    /// The library-side view consumed by the runtime.
    pub fn sync_settings(&self) -> SyncSettings {
        let mut settings =
            SyncSettings::new(self.primary(), self.metadata(), &self.processing.output_dir);
        settings.monitor_days = self.processing.monitor_days;
        settings.retention_days = self.processing.retention_days;
        settings.sweep_interval = Duration::from_secs(self.processing.sweep_interval_secs);
        settings.primary_columns = self.processing.primary_columns.clone();
        settings
    }
}

fn rebase_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || base.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
