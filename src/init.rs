use crate::error::InitError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Output format of the `fmt` layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Multi-line, human-readable output.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per line.
    #[cfg(feature = "json")]
    Json,
}

/// Configuration of the global subscriber.
///
/// **Fields**
/// - `filter`: an `EnvFilter` directive, e.g. `"info"` or
///   `"log_context=debug,hyper=warn"`.
/// - `format`: [`OutputFormat`] of the `fmt` layer.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: OutputFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: OutputFormat::default(),
        }
    }
}

/// Install the global `tracing` subscriber described by `config`.
///
/// **Parameters**
/// - `config`: [`LoggingConfig`] with the filter directive and output
///   format.
///
/// **Returns**
/// - `Ok(())` once a [`Registry`] with an [`EnvFilter`] and a `fmt` layer
///   is the process-wide default, so events forwarded by
///   [`TracingSink`](crate::tracing_sink::TracingSink) are printed.
/// - `Err(InitError::Filter)` if the filter directive does not parse.
/// - `Err(InitError::AlreadySet)` if a global subscriber already exists.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InitError> {
    let filter = EnvFilter::try_new(&config.filter)?;
    let registry = Registry::default().with(filter);

    // Each fmt layer flavour is a distinct type, so each arm installs its
    // own subscriber.
    match config.format {
        OutputFormat::Pretty => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().pretty()))?
        }
        OutputFormat::Compact => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().compact()))?
        }
        #[cfg(feature = "json")]
        OutputFormat::Json => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))?
        }
    }
    Ok(())
}

/// Initialize tracing with [`LoggingConfig::default`].
pub fn init_tracing_default() -> Result<(), InitError> {
    init_tracing(&LoggingConfig::default())
}
