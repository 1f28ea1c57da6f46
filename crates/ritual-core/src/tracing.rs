//! Tracing setup shared by the daemon and front-ends.
//!
//! Logs always go to stderr so that front-ends keep stdout for their own
//! output. `RUST_LOG` overrides the configured level unless an explicit
//! filter is given.
//!
//! ```ignore
//! use ritual_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::daemon())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

use crate::CRATE_TARGETS;

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per line, for the daemon log file.
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to the ritual crates when neither `RUST_LOG` nor
    /// `env_filter` is set.
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Include file and line of each event.
    pub include_location: bool,
    pub include_target: bool,
    /// Log span creation and close, which times each dispatched call.
    pub include_span_events: bool,
    /// Colorize output.
    pub ansi: bool,
    /// Custom env filter directive (overrides default_level if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Pretty,
            include_location: false,
            include_target: true,
            include_span_events: false,
            ansi: true,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Quiet, compact logging for a front-end process.
    #[must_use]
    pub fn front_end() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_target: false,
            ..Self::default()
        }
    }

    /// Verbose front-end logging, e.g. behind a `--debug` flag.
    #[must_use]
    pub fn front_end_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::front_end()
        }
    }

    /// Structured JSON logging for the daemon.
    #[must_use]
    pub fn daemon() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Json,
            include_location: true,
            include_target: true,
            include_span_events: true,
            ansi: false,
            env_filter: None,
        }
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a custom env filter directive
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The filter directive derived from `default_level`.
    pub fn default_directive(&self) -> String {
        let level = self.default_level.as_str().to_ascii_lowercase();
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(filter) = &self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive())))
    }

    fn build_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.include_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(self.ansi)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(self.include_target)
            .with_span_events(span_events);

        match self.output_format {
            TracingOutputFormat::Pretty => layer.pretty().boxed(),
            TracingOutputFormat::Compact => layer.compact().without_time().boxed(),
            TracingOutputFormat::Json => layer.json().boxed(),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed or if the
/// explicit filter directive does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.build_filter()?;
    let subscriber = tracing_subscriber::registry()
        .with(config.build_layer())
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
