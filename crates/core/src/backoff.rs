// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policies.
//!
//! A [`BackoffStrategy`] maps the current retry attempt (0-based) to either a
//! wait duration or [`Backoff::Stop`]. Strategies hold no state; the state
//! machine supplies the attempt counter on every decision, so new policies
//! plug in without touching the machine.

use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;

/// Decision returned by a [`BackoffStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry after this delay.
    Wait(Duration),
    /// Give up: the connection settles in `Disconnected`.
    Stop,
}

impl Backoff {
    /// The wait duration, or `None` for `Stop`.
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Backoff::Wait(delay) => Some(*delay),
            Backoff::Stop => None,
        }
    }
}

/// Policy computing the wait before a reconnect attempt.
pub trait BackoffStrategy: Send + Sync {
    fn duration_at(&self, attempt: u32) -> Backoff;
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for Box<S> {
    fn duration_at(&self, attempt: u32) -> Backoff {
        (**self).duration_at(attempt)
    }
}

/// Default cooldown taken every [`DEFAULT_COOLDOWN_EVERY`] attempts.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(10_000);
/// Default period of the linear cooldown.
pub const DEFAULT_COOLDOWN_EVERY: u32 = 6;
/// Default base delay of the linear policy.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(5_000);

/// Fixed cadence with a periodic longer pause.
///
/// Waits `base` for every attempt except each `every`-th one (attempt > 0),
/// which waits `cooldown` instead. Never stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    base: Duration,
    cooldown: Duration,
    every: u32,
}

impl LinearBackoff {
    /// Linear policy with the default 10s cooldown every 6th attempt.
    pub fn new(base: Duration) -> Self {
        LinearBackoff {
            base,
            cooldown: DEFAULT_COOLDOWN,
            every: DEFAULT_COOLDOWN_EVERY,
        }
    }

    /// Override the cooldown and its period. A period of 0 disables it.
    pub fn with_cooldown(mut self, cooldown: Duration, every: u32) -> Self {
        self.cooldown = cooldown;
        self.every = every;
        self
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        LinearBackoff::new(DEFAULT_BASE_DELAY)
    }
}

impl BackoffStrategy for LinearBackoff {
    fn duration_at(&self, attempt: u32) -> Backoff {
        if self.every > 0 && attempt > 0 && attempt % self.every == 0 {
            return Backoff::Wait(self.cooldown);
        }
        Backoff::Wait(self.base)
    }
}

/// Exponential growth from `initial` up to `max`, optionally jittered.
///
/// With `jitter == 0.0` the policy is deterministic. Otherwise the delay is
/// blended with a uniform sample from `[0, delay]` in proportion to `jitter`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    factor: f64,
    jitter: f64,
}

impl ExponentialBackoff {
    pub fn new(
        initial: Duration,
        max: Duration,
        factor: f64,
        jitter: f64,
    ) -> Result<Self, ConfigError> {
        if initial.is_zero() {
            return Err(ConfigError::InvalidBackoff(
                "initial delay must be > 0".to_string(),
            ));
        }
        if max < initial {
            return Err(ConfigError::InvalidBackoff(
                "max delay must be >= initial delay".to_string(),
            ));
        }
        if !factor.is_finite() || factor < 1.0 {
            return Err(ConfigError::InvalidBackoff(
                "factor must be >= 1.0".to_string(),
            ));
        }
        if !jitter.is_finite() || !(0.0..=1.0).contains(&jitter) {
            return Err(ConfigError::InvalidBackoff(
                "jitter must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(ExponentialBackoff {
            initial,
            max,
            factor,
            jitter,
        })
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn duration_at(&self, attempt: u32) -> Backoff {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let initial = self.initial.as_secs_f64();
        let max = self.max.as_secs_f64();
        let base = (initial * self.factor.powi(exponent)).min(max);

        if self.jitter == 0.0 {
            return Backoff::Wait(Duration::from_secs_f64(base));
        }

        let sample = rand::thread_rng().gen_range(0.0..=base);
        let blended = base * (1.0 - self.jitter) + sample * self.jitter;
        Backoff::Wait(Duration::from_secs_f64(blended))
    }
}

/// Wraps a policy and stops once `max_retries` attempts have been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capped<S> {
    inner: S,
    max_retries: u32,
}

impl<S: BackoffStrategy> Capped<S> {
    pub fn new(inner: S, max_retries: u32) -> Self {
        Capped { inner, max_retries }
    }
}

impl<S: BackoffStrategy> BackoffStrategy for Capped<S> {
    fn duration_at(&self, attempt: u32) -> Backoff {
        if attempt >= self.max_retries {
            return Backoff::Stop;
        }
        self.inner.duration_at(attempt)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
