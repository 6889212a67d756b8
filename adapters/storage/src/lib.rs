#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! File-backed persistence for the world and the engine configuration.
//!
//! The world is stored as one pretty-printed JSON object. Saves go through a
//! temporary file in the same directory followed by a rename, so a crash never
//! leaves a half-written state file behind.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info};
use world_level_system_scheduler::EngineConfig;
use world_level_world::{World, WorldSnapshot};

/// Failures reading or writing the state file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file could not be read or written.
    #[error("state file {path} could not be accessed")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The file does not hold a valid snapshot.
    #[error("state file {path} is not a valid world snapshot")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// JSON state file holding one [`WorldSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store for the file at `path`. Nothing is touched until the
    /// first load or save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot. A missing file yields `None`.
    pub fn load(&self) -> Result<Option<WorldSnapshot>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes the snapshot, replacing the previous file atomically.
    pub fn save(&self, snapshot: &WorldSnapshot) -> Result<(), StorageError> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(directory).map_err(|source| self.io_error(source))?;

        let file = NamedTempFile::new_in(directory).map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot).map_err(|source| {
            StorageError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(|source| self.io_error(source))?;
        let file = writer
            .into_inner()
            .map_err(|error| self.io_error(error.into_error()))?;
        let _ = file
            .persist(&self.path)
            .map_err(|error| self.io_error(error.error))?;

        debug!(path = %self.path.display(), level = snapshot.world_level, "world saved");
        Ok(())
    }

    /// Loads the world or starts a fresh one.
    ///
    /// A missing file starts a fresh world silently. An unreadable or
    /// corrupt file is logged and also starts a fresh world at level one.
    #[must_use]
    pub fn load_or_init(&self, config: &EngineConfig, now: DateTime<Utc>) -> World {
        match self.load() {
            Ok(Some(snapshot)) => {
                info!(
                    path = %self.path.display(),
                    level = snapshot.world_level,
                    "world loaded"
                );
                config.restore_world(snapshot, now)
            }
            Ok(None) => {
                info!(path = %self.path.display(), "no saved world, starting fresh");
                config.fresh_world(now)
            }
            Err(error) => {
                error!(%error, "failed to load world, starting fresh");
                config.fresh_world(now)
            }
        }
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Reads the engine configuration. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        info!(path = %path.display(), "no configuration file, using defaults");
        return Ok(EngineConfig::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    let config: EngineConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse configuration at {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid configuration at {}", path.display()))?;
    Ok(config)
}
