//! Peer and logging configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use syncbox_protocol::SERVER_USERNAME;

// ---------------------------------------------------------------------------
// LogConfig
// ---------------------------------------------------------------------------

/// Which log channels a [`Logger`](crate::Logger) emits, and under what
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Application name attached to every event.
    pub prefix: String,
    pub info: bool,
    pub error: bool,
    pub debug: bool,
    /// Per-packet and per-message chatter. Off by default.
    pub verbose: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            prefix: "syncbox".to_string(),
            info: true,
            error: true,
            debug: true,
            verbose: false,
        }
    }
}

impl LogConfig {
    /// A config with every channel off.
    pub fn silent() -> Self {
        Self {
            info: false,
            error: false,
            debug: false,
            verbose: false,
            ..Self::default()
        }
    }

    /// The most detailed `tracing` level any enabled channel needs, as an
    /// `EnvFilter` directive.
    pub fn filter_directive(&self) -> &'static str {
        if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else if self.info {
            "info"
        } else if self.error {
            "error"
        } else {
            "off"
        }
    }
}

// ---------------------------------------------------------------------------
// PeerConfig
// ---------------------------------------------------------------------------

/// Configuration for one end of a Syncbox connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Name this peer puts in every request it sends.
    pub username: String,

    /// How long a receive waits before giving up.
    pub recv_timeout: Duration,

    #[serde(default)]
    pub log: LogConfig,
}

impl PeerConfig {
    /// Client-side config for `username` with default timeouts.
    pub fn client(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Server-side config, identified as [`SERVER_USERNAME`].
    pub fn server() -> Self {
        Self {
            username: SERVER_USERNAME.to_string(),
            ..Self::default()
        }
    }

    pub fn recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = timeout;
        self
    }

    pub fn log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            recv_timeout: Duration::from_secs(30),
            log: LogConfig::default(),
        }
    }
}
