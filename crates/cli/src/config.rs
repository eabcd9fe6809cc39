// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command configuration.
//!
//! Settings come from an optional TOML file (`--config`, or `TETHER_CONFIG`)
//! overlaid by command-line flags:
//!
//! ```toml
//! url = "wss://example.com/feed"
//! heartbeat_text = "ping"
//! receive = "Message"
//!
//! [headers]
//! authorization = "Bearer secret"
//!
//! [backoff]
//! strategy = "linear"
//! base_ms = 2000
//! max_retries = 20
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tether_core::BackoffConfig;

use crate::cli::Cli;
use crate::env;
use crate::error::{Error, Result};

/// Contents of a config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub heartbeat_text: Option<String>,
    pub receive: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}

fn default_receive() -> String {
    "Message".to_string()
}

fn default_label() -> String {
    "tether".to_string()
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub heartbeat_text: Option<String>,
    pub receive: String,
    pub label: String,
    pub backoff: BackoffConfig,
}

impl Settings {
    /// Load the config file named by the flags (or `TETHER_CONFIG`) and
    /// apply the flags on top.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let path: Option<PathBuf> = cli.config.clone().or_else(env::config_path);
        let file = match path {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let url = cli.url.clone().or(file.url).ok_or(Error::MissingUrl)?;

        let mut headers: Vec<(String, String)> = file.headers.into_iter().collect();
        for raw in &cli.headers {
            headers.push(parse_header(raw)?);
        }

        let mut backoff = file.backoff;
        if let Some(limit) = cli.max_retries {
            backoff.set_max_retries(Some(limit));
        }
        backoff.validate()?;

        Ok(Settings {
            url,
            headers,
            heartbeat_text: cli.heartbeat_text.clone().or(file.heartbeat_text),
            receive: cli
                .receive
                .clone()
                .or(file.receive)
                .unwrap_or_else(default_receive),
            label: cli.label.clone().or(file.label).unwrap_or_else(default_label),
            backoff,
        })
    }
}

/// Split `NAME:VALUE`, trimming whitespace around both parts.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
