//! Tracing configuration for the command-line tool
//!
//! The library only emits events; the binary decides how they are rendered.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default)
    Console,
    /// Plain output without ANSI colors, for CI logs
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Run identifier attached to the start event
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Install the global subscriber
    ///
    /// `log` records from the library are forwarded into the same subscriber.
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = match &self.env_filter {
            Some(env_filter) => EnvFilter::try_new(env_filter)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };

        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr);
                registry.with(fmt_layer).try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::info!(session_id = %session_id, "logo normalization session started");
        }

        Ok(())
    }
}

/// Initialize tracing with CLI defaults and a fresh session id
///
/// Returns the session id so it can be stored in the batch report.
pub fn init_cli_tracing(verbosity: u8, json: bool) -> anyhow::Result<String> {
    let session_id = uuid::Uuid::new_v4().to_string();

    #[cfg(feature = "tracing-json")]
    let format = if json {
        TracingFormat::Json
    } else {
        TracingFormat::Console
    };
    #[cfg(not(feature = "tracing-json"))]
    let format = {
        if json {
            eprintln!("JSON logs need the `tracing-json` feature, using console output");
        }
        TracingFormat::Console
    };

    let mut config = TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_session_id(session_id.clone());
    if let Ok(filter) = std::env::var("RUST_LOG") {
        config = config.with_env_filter(filter);
    }
    config.init()?;

    Ok(session_id)
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span covering a whole batch run
    pub fn batch_processing(session_id: &str, file_count: usize, jobs: usize) -> Span {
        tracing::span!(
            Level::INFO,
            "batch_processing",
            session_id = %session_id,
            file_count = %file_count,
            jobs = %jobs
        )
    }

    /// Span for one input file
    pub fn file_processing(file_path: &std::path::Path, target: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "file_processing",
            file_path = %file_path.display(),
            target = %target
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, error};

    /// Log an error with context
    pub fn error_with_context(error: &dyn std::fmt::Display, context: &str) {
        error!(
            error = %error,
            context = %context,
            "operation failed"
        );
    }

    /// Log performance metrics
    pub fn performance_metric(operation: &str, duration_ms: u64, items: usize) {
        debug!(
            operation = %operation,
            duration_ms = %duration_ms,
            items = %items,
            "performance metric"
        );
    }
}
