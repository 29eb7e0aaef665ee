//! Structured logging setup for the harness and its tools.
//!
//! Every crate logs through `tracing`; binaries call [`init_logging`] once.
//! `RUST_LOG` takes precedence over the configured level.

use crate::error::CoreError;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Verbosity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Everything, including per-op execution.
    Trace,
    /// Per-case progress.
    Debug,
    /// Suite summaries.
    Info,
    /// Failures and skipped work.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Level for a count of `-v` flags: none is warn, one info, two debug, more trace.
    pub fn from_verbosity(count: u8) -> Self {
        [LogLevel::Warn, LogLevel::Info, LogLevel::Debug]
            .get(usize::from(count))
            .copied()
            .unwrap_or(LogLevel::Trace)
    }

    fn directive(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(CoreError::InvalidConfig(format!("unknown log level '{other}'"))),
        }
    }
}

/// How the global subscriber is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Threshold used when `RUST_LOG` is unset.
    pub level: LogLevel,
    /// One JSON object per event instead of human-readable lines.
    pub json: bool,
    /// Emit an event with elapsed time when each span closes.
    pub span_timings: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json: false,
            span_timings: false,
        }
    }
}

impl LoggingConfig {
    /// Info level, plain text, no span timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default threshold.
    pub fn with_level(self, level: LogLevel) -> Self {
        Self { level, ..self }
    }

    /// Switch to JSON output.
    pub fn with_json_format(self, json: bool) -> Self {
        Self { json, ..self }
    }

    /// Log span close events with timings.
    pub fn with_span_timings(self, span_timings: bool) -> Self {
        Self {
            span_timings,
            ..self
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from(self.level.directive()).into())
            .from_env_lossy()
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Returns `false` when a subscriber is already installed, as happens when
/// several tests in one process ask for logging.
///
/// ```no_run
/// use opcheck_core::logging::{init_logging, LogLevel, LoggingConfig};
///
/// init_logging(LoggingConfig::new().with_level(LogLevel::Debug));
/// ```
pub fn init_logging(config: LoggingConfig) -> bool {
    let spans = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let json = config.json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(spans.clone())
            .with_writer(std::io::stderr)
    });
    let plain = (!config.json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_span_events(spans.clone())
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(config.filter())
        .with(json)
        .with(plain)
        .try_init()
        .is_ok()
}
