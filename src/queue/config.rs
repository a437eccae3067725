//! Queue settings.
//!
//! Settings start from defaults, can be built up with `with_*` methods,
//! read from JSON, or loaded from `QUEUE_<NAME>_*` environment variables.
//! Overrides are layered with [`QueueSettingsOverride`], whose fields are
//! [`Optional`] so that "leave unchanged" and "set to zero" stay distinct.
//!
//! # Environment
//!
//! For a queue named `mail-sender` the recognised variables are:
//!
//! - `QUEUE_MAIL_SENDER_LENGTH`: capacity
//! - `QUEUE_MAIL_SENDER_UNIQUE`: `1`/`t`/`true`/... or `0`/`f`/`false`/...
//! - `QUEUE_MAIL_SENDER_BATCH_LENGTH`
//! - `QUEUE_MAIL_SENDER_MAX_WORKERS`

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::types::{Optional, parse_bool};

use super::error::ConfigError;

/// Default number of buffered payloads.
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest accepted capacity; free slots are semaphore permits.
pub const MAX_CAPACITY: usize = Semaphore::MAX_PERMITS;

/// Default number of items handed to one handler call.
pub const DEFAULT_BATCH_LENGTH: usize = 20;

/// Default number of worker tasks.
pub const DEFAULT_MAX_WORKERS: usize = 1;

/// Settings for one named queue.
///
/// The channel queue only reads `capacity` and `unique`; the batch and worker
/// fields are consumed by [`WorkerPoolQueue`](crate::worker::WorkerPoolQueue).
/// Unknown fields in JSON input are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Queue name, used in logs and environment variable names.
    pub name: String,

    /// Maximum number of buffered payloads.
    #[serde(alias = "length")]
    pub capacity: usize,

    /// Whether duplicate payloads are rejected while buffered.
    pub unique: bool,

    /// Maximum items per handler call.
    pub batch_length: usize,

    /// Number of worker tasks.
    pub max_workers: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::new("default")
    }
}

impl QueueSettings {
    /// Creates settings with default values.
    pub fn new(name: impl Into<String>) -> Self {
        QueueSettings {
            name: name.into(),
            capacity: DEFAULT_CAPACITY,
            unique: false,
            batch_length: DEFAULT_BATCH_LENGTH,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_batch_length(mut self, batch_length: usize) -> Self {
        self.batch_length = batch_length;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Checks that every size is positive and the capacity is at most
    /// [`MAX_CAPACITY`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_capacity()?;
        if self.batch_length == 0 {
            return Err(ConfigError::ZeroBatchLength(self.name.clone()));
        }
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroMaxWorkers(self.name.clone()));
        }
        Ok(())
    }

    /// Checks only the fields the channel queue reads.
    pub(super) fn validate_capacity(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity(self.name.clone()));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                name: self.name.clone(),
                capacity: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }

    /// Returns these settings with every present override field applied.
    pub fn apply(mut self, overrides: &QueueSettingsOverride) -> Self {
        self.capacity = overrides.capacity.value_or(self.capacity);
        self.unique = overrides.unique.value_or(self.unique);
        self.batch_length = overrides.batch_length.value_or(self.batch_length);
        self.max_workers = overrides.max_workers.value_or(self.max_workers);
        self
    }

    /// Loads settings for `name` from `QUEUE_<NAME>_*` environment variables.
    pub fn from_env(name: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(name, |key| std::env::var(key).ok())
    }

    /// Loads settings for `name`, resolving variables through `lookup`.
    ///
    /// Missing variables keep their defaults. The result is validated.
    pub fn from_lookup<F>(name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = QueueSettingsOverride::from_lookup(name, lookup)?;
        let settings = Self::new(name).apply(&overrides);
        settings.validate()?;
        Ok(settings)
    }
}

/// Partial settings layered over a base [`QueueSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettingsOverride {
    #[serde(alias = "length")]
    pub capacity: Optional<usize>,
    pub unique: Optional<bool>,
    pub batch_length: Optional<usize>,
    pub max_workers: Optional<usize>,
}

impl QueueSettingsOverride {
    /// Reads the overrides for `name` through `lookup`.
    pub fn from_lookup<F>(name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = env_prefix(name);
        let read = |suffix: &str| {
            let key = format!("{prefix}_{suffix}");
            lookup(&key).map(|value| (key, value))
        };

        let unique = match read("UNIQUE") {
            Some((key, value)) => {
                let parsed = parse_bool(value.trim());
                if !parsed.has() {
                    return Err(ConfigError::InvalidValue { key, value });
                }
                parsed
            }
            None => Optional::none(),
        };

        Ok(QueueSettingsOverride {
            capacity: parse_number(read("LENGTH"))?,
            unique,
            batch_length: parse_number(read("BATCH_LENGTH"))?,
            max_workers: parse_number(read("MAX_WORKERS"))?,
        })
    }
}

/// `mail-sender` becomes `QUEUE_MAIL_SENDER`.
fn env_prefix(name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("QUEUE_{normalized}")
}

fn parse_number<T: FromStr>(
    entry: Option<(String, String)>,
) -> Result<Optional<T>, ConfigError> {
    match entry {
        Some((key, value)) => value
            .trim()
            .parse()
            .map(Optional::some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(Optional::none()),
    }
}
