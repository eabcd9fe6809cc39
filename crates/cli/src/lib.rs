// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether_cli - the `tether` command.
//!
//! Opens one resilient WebSocket connection, prints what it receives, and
//! sends each line of stdin as a text message.
//!
//! # Main Components
//!
//! - [`Cli`] - command-line flags
//! - [`config::Settings`] - flags merged over the optional TOML config file
//! - [`error::Error`] - user-facing errors with hints

mod app;
mod cli;
mod colors;
mod env;
mod render;

pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

use config::Settings;

/// Install the stderr log subscriber. `TETHER_LOG` overrides the level
/// chosen by `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve settings and run the session to completion.
pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_cli(&cli)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run(settings))
}
