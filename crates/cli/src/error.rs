// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

use tether_core::{ConfigError, DispatchError};

/// Errors reported by the `tether` command.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no url given\n  hint: pass a ws:// url or set `url` in the config file")]
    MissingUrl,

    #[error("invalid header '{0}'\n  hint: headers are written as NAME:VALUE")]
    InvalidHeader(String),

    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("gave up reconnecting\n  hint: raise --max-retries or check that the server is reachable")]
    GaveUp,

    #[error(transparent)]
    Setup(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
