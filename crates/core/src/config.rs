// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection and retry-policy configuration.
//!
//! [`BackoffConfig`] is serde-friendly so front ends can load it from a file:
//!
//! ```toml
//! strategy = "exponential"
//! initial_ms = 250
//! max_ms = 30000
//! max_retries = 10
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::{
    BackoffStrategy, Capped, ExponentialBackoff, LinearBackoff, DEFAULT_BASE_DELAY,
    DEFAULT_COOLDOWN, DEFAULT_COOLDOWN_EVERY,
};
use crate::bus::DEFAULT_SUBSCRIBER_CAPACITY;
use crate::error::ConfigError;

/// Behaviour switches for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Name attached to every log line the connection emits.
    pub label: String,
    /// Connect as soon as the connection is built.
    pub auto_start: bool,
    /// When true, a reconnect after a successful open restarts the backoff
    /// at attempt 0. When false it resumes from the attempt that opened.
    pub reset_retry_on_connect: bool,
    /// Events each observer may leave unread before it is dropped.
    pub subscriber_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            label: "tether".to_string(),
            auto_start: false,
            reset_retry_on_connect: true,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

/// Serializable description of a [`BackoffStrategy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffConfig {
    Linear {
        #[serde(default = "default_base_ms")]
        base_ms: u64,
        #[serde(default = "default_cooldown_ms")]
        cooldown_ms: u64,
        #[serde(default = "default_cooldown_every")]
        cooldown_every: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_retries: Option<u32>,
    },
    Exponential {
        #[serde(default = "default_initial_ms")]
        initial_ms: u64,
        #[serde(default = "default_max_ms")]
        max_ms: u64,
        #[serde(default = "default_factor")]
        factor: f64,
        #[serde(default = "default_jitter")]
        jitter: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_retries: Option<u32>,
    },
}

fn default_base_ms() -> u64 {
    millis(DEFAULT_BASE_DELAY)
}

fn default_cooldown_ms() -> u64 {
    millis(DEFAULT_COOLDOWN)
}

fn default_cooldown_every() -> u32 {
    DEFAULT_COOLDOWN_EVERY
}

fn default_initial_ms() -> u64 {
    1_000
}

fn default_max_ms() -> u64 {
    60_000
}

fn default_factor() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.0
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig::Linear {
            base_ms: default_base_ms(),
            cooldown_ms: default_cooldown_ms(),
            cooldown_every: default_cooldown_every(),
            max_retries: None,
        }
    }
}

impl BackoffConfig {
    /// Returns the configured retry limit, if any.
    pub fn max_retries(&self) -> Option<u32> {
        match self {
            BackoffConfig::Linear { max_retries, .. }
            | BackoffConfig::Exponential { max_retries, .. } => *max_retries,
        }
    }

    /// Replace the retry limit.
    pub fn set_max_retries(&mut self, limit: Option<u32>) {
        match self {
            BackoffConfig::Linear { max_retries, .. }
            | BackoffConfig::Exponential { max_retries, .. } => *max_retries = limit,
        }
    }

    /// Check the settings without building a strategy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clone().into_strategy().map(|_| ())
    }

    /// Build the strategy, wrapped in [`Capped`] when `max_retries` is set.
    pub fn into_strategy(self) -> Result<Box<dyn BackoffStrategy>, ConfigError> {
        let limit = self.max_retries();
        let strategy: Box<dyn BackoffStrategy> = match self {
            BackoffConfig::Linear {
                base_ms,
                cooldown_ms,
                cooldown_every,
                ..
            } => {
                if base_ms == 0 {
                    return Err(ConfigError::InvalidBackoff(
                        "base delay must be > 0".to_string(),
                    ));
                }
                Box::new(
                    LinearBackoff::new(Duration::from_millis(base_ms))
                        .with_cooldown(Duration::from_millis(cooldown_ms), cooldown_every),
                )
            }
            BackoffConfig::Exponential {
                initial_ms,
                max_ms,
                factor,
                jitter,
                ..
            } => Box::new(ExponentialBackoff::new(
                Duration::from_millis(initial_ms),
                Duration::from_millis(max_ms),
                factor,
                jitter,
            )?),
        };

        Ok(match limit {
            Some(max_retries) => Box::new(Capped::new(strategy, max_retries)),
            None => strategy,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
