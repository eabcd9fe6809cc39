// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Parser;

const AFTER_HELP: &str = "\
Examples:
  tether ws://localhost:9000/feed                 Print incoming messages
  tether -H 'authorization: Bearer x' wss://...   Send a handshake header
  tether --receive ConnectionState ws://...       Print state changes only
  echo hello | tether ws://localhost:9000/echo    Send stdin lines as text

Receive types:
  Message, TransportEvent, ConnectionState, MachineEvent";

/// Keep a WebSocket connection open, reconnecting on failure.
///
/// Lines read from stdin are sent as text messages. Received events are
/// printed to stdout; connection state changes go to stderr.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tether", version, after_help = AFTER_HELP)]
pub struct Cli {
    /// WebSocket URL (ws:// or wss://). Overrides the config file.
    pub url: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Extra handshake header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Which events to print
    #[arg(short, long, value_name = "TYPE")]
    pub receive: Option<String>,

    /// Incoming text frames equal to this are treated as keep-alives
    #[arg(long, value_name = "TEXT")]
    pub heartbeat_text: Option<String>,

    /// Give up after this many consecutive retries
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Name shown in log lines
    #[arg(long)]
    pub label: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
