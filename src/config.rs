//! TOML configuration for the job queue runner.
//!
//! Resolution: an explicit path, then the `JOBQUEUE_CONFIG` environment
//! variable, then compiled-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "JOBQUEUE_CONFIG";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobQueueConfig {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JobQueueConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .queue
            .validate()
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Use `explicit` if given (failure is fatal), else `JOBQUEUE_CONFIG`
    /// (failure falls back to defaults), else defaults.
    ///
    /// Logs nothing; callers log the returned [`ConfigSource`] once tracing
    /// is initialised.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        Self::resolve_from(explicit, std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    fn resolve_from(
        explicit: Option<&Path>,
        env_path: Option<PathBuf>,
    ) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        match env_path {
            Some(path) => match Self::load(&path) {
                Ok(config) => Ok((config, ConfigSource::Env(path))),
                Err(e) => Ok((
                    Self::default(),
                    ConfigSource::EnvFallback {
                        path,
                        error: format!("{e:#}"),
                    },
                )),
            },
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    /// `JOBQUEUE_CONFIG` was set but could not be loaded.
    EnvFallback { path: PathBuf, error: String },
    Defaults,
}

impl ConfigSource {
    /// Report the resolution through tracing.
    pub fn log(&self) {
        match self {
            Self::Explicit(path) | Self::Env(path) => {
                info!(path = %path.display(), "loaded job queue configuration");
            }
            Self::EnvFallback { path, error } => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "JOBQUEUE_CONFIG set but file could not be loaded, using defaults"
                );
            }
            Self::Defaults => debug!("no config file given, using compiled-in defaults"),
        }
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Sizing of the queue's index array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Slots allocated up front; doubled whenever the array fills.
    pub initial_capacity: usize,
    /// Halving after a dequeue never goes below this.
    pub min_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 10,
            min_capacity: 10,
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_capacity == 0 {
            bail!("queue.min_capacity must be at least 1");
        }
        if self.initial_capacity < self.min_capacity {
            bail!(
                "queue.initial_capacity ({}) is below queue.min_capacity ({})",
                self.initial_capacity,
                self.min_capacity
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines on stderr instead of the human format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
