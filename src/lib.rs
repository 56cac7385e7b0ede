// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod content;
pub mod overlay;
pub mod reveal;
pub mod runtime;
pub mod scroll;
pub mod sequence;
pub mod stage;
pub mod ui;
pub mod util;

pub const TICK_RATE_MS: u64 = 33;

use std::fmt;

/// Construction-time validation failure. Malformed configuration is rejected
/// up front so event processing never has to deal with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyTargetSequence,
    EmptyRevealScript,
    BadChannelStops(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyTargetSequence => write!(f, "target sequence must not be empty"),
            ConfigError::EmptyRevealScript => write!(f, "reveal script must not be empty"),
            ConfigError::BadChannelStops(msg) => write!(f, "bad channel stops: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
