//! Tracing subscriber setup for binaries and demos embedding the exchange.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the application. `RUST_LOG` always overrides the configured
//! default level.

use std::env;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to pretty
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `order_matching=debug`
    pub default_level: String,
    /// Include source file and line
    pub include_location: bool,
    pub include_thread_ids: bool,
    /// Include target (module path)
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            default_level: "info".to_string(),
            include_location: false,
            include_thread_ids: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    ///
    /// Reads:
    /// - `LOG_FORMAT`: pretty, compact, or json
    /// - `LOG_LEVEL`: default filter (fallback if RUST_LOG not set)
    /// - `LOG_LOCATION`: true/false for file:line info
    /// - `LOG_THREAD_IDS`: true/false for thread IDs
    pub fn from_env() -> Self {
        let flag = |name: &str, default: bool| {
            env::var(name)
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default)
        };

        Self {
            format: env::var("LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or_default(),
            default_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            include_location: flag("LOG_LOCATION", false),
            include_thread_ids: flag("LOG_THREAD_IDS", false),
            include_target: true,
        }
    }

    /// Machine-readable output with thread ids, for log shippers
    pub fn json() -> Self {
        Self {
            format: LogFormat::Json,
            include_location: true,
            include_thread_ids: true,
            ..Default::default()
        }
    }

    pub fn compact() -> Self {
        Self {
            format: LogFormat::Compact,
            ..Default::default()
        }
    }

    /// Set the default log level
    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Install a global subscriber for the given configuration
///
/// # Errors
///
/// Returns an error if a global subscriber is already set
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer()
        .with_target(config.include_target)
        .with_thread_ids(config.include_thread_ids)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
        LogFormat::Compact => registry.with(layer.compact()).try_init()?,
        LogFormat::Json => registry.with(layer.json()).try_init()?,
    }

    Ok(())
}
