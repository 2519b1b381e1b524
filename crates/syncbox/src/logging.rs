//! Explicitly constructed logging.
//!
//! There is no process-wide logger. Each component that logs holds its own
//! [`Logger`], built from a [`LogConfig`]. Events go through `tracing`, so
//! whatever subscriber the application installs (see [`init`]) decides
//! where they end up.
//!
//! The four channels map onto `tracing` levels:
//!
//! | channel   | level   |
//! |-----------|---------|
//! | `info`    | INFO    |
//! | `error`   | ERROR   |
//! | `debug`   | DEBUG   |
//! | `verbose` | TRACE   |

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// A handle that emits events on the channels its config enables.
///
/// Every event carries the configured prefix and the caller's source
/// location.
#[derive(Debug, Clone)]
pub struct Logger {
    config: LogConfig,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// A logger with every channel off.
    pub fn silent() -> Self {
        Self::new(LogConfig::silent())
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    #[track_caller]
    pub fn info(&self, message: fmt::Arguments<'_>) {
        if self.config.info {
            let at = Location::caller();
            tracing::info!(app = %self.config.prefix, file = at.file(), line = at.line(), "{message}");
        }
    }

    /// Logs at ERROR. A backtrace is attached when `RUST_BACKTRACE` asks
    /// for one.
    #[track_caller]
    pub fn error(&self, message: fmt::Arguments<'_>) {
        if self.config.error {
            let at = Location::caller();
            let backtrace = Backtrace::capture();
            if backtrace.status() == BacktraceStatus::Captured {
                tracing::error!(
                    app = %self.config.prefix,
                    file = at.file(),
                    line = at.line(),
                    %backtrace,
                    "{message}"
                );
            } else {
                tracing::error!(app = %self.config.prefix, file = at.file(), line = at.line(), "{message}");
            }
        }
    }

    #[track_caller]
    pub fn debug(&self, message: fmt::Arguments<'_>) {
        if self.config.debug {
            let at = Location::caller();
            tracing::debug!(app = %self.config.prefix, file = at.file(), line = at.line(), "{message}");
        }
    }

    #[track_caller]
    pub fn verbose(&self, message: fmt::Arguments<'_>) {
        if self.config.verbose {
            let at = Location::caller();
            tracing::trace!(app = %self.config.prefix, file = at.file(), line = at.line(), "{message}");
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogConfig::default())
    }
}

/// Installs a global `fmt` subscriber for the application.
///
/// `RUST_LOG` wins when set; otherwise the filter follows the most
/// detailed channel `config` enables. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Collects formatted events in memory.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(logger: &Logger, log: impl FnOnce(&Logger)) -> String {
        let sink = Capture::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || log(logger));
        sink.contents()
    }

    #[test]
    fn test_default_channels() {
        let out = capture(&Logger::default(), |l| {
            l.info(format_args!("info-line"));
            l.error(format_args!("error-line"));
            l.debug(format_args!("debug-line"));
            l.verbose(format_args!("verbose-line"));
        });

        assert!(out.contains("info-line"));
        assert!(out.contains("error-line"));
        assert!(out.contains("debug-line"));
        assert!(!out.contains("verbose-line"));
    }

    #[test]
    fn test_silent_logger_emits_nothing() {
        let out = capture(&Logger::silent(), |l| {
            l.info(format_args!("a"));
            l.error(format_args!("b"));
            l.debug(format_args!("c"));
            l.verbose(format_args!("d"));
        });
        assert!(out.is_empty());
    }

    #[test]
    fn test_verbose_only() {
        let logger = Logger::new(LogConfig {
            verbose: true,
            ..LogConfig::silent()
        });
        let out = capture(&logger, |l| {
            l.info(format_args!("hidden"));
            l.verbose(format_args!("shown {}", 42));
        });

        assert!(out.contains("shown 42"));
        assert!(!out.contains("hidden"));
        assert!(out.contains("TRACE"));
    }

    #[test]
    fn test_events_carry_prefix_and_location() {
        let logger = Logger::new(LogConfig {
            prefix: "syncbox-test".into(),
            ..LogConfig::default()
        });
        let out = capture(&logger, |l| l.info(format_args!("located")));

        assert!(out.contains("app=syncbox-test"));
        assert!(out.contains("logging.rs"));
    }
}
