//! Logging system.
//!
//! Structured logging through `tracing`, with the output format and
//! destination taken from [`LogConfig`]. `RUST_LOG` overrides the configured
//! level when set.

use provisioning_types::config::LogConfig;
use provisioning_types::{LogFormat, LogLevel, ProvisionError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Target prefix shared by every crate in the workspace.
pub const LOG_TARGET: &str = "provisioning";

/// Keeps the background log writer alive; drop it at exit to flush.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Default filter directive for a level.
pub fn default_directive(level: LogLevel) -> String {
    format!("{}={}", LOG_TARGET, level.as_filter())
}

/// Initialize logging from configuration.
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.level)));

    let (writer, guard) = match &config.path {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file = path.file_name().ok_or_else(|| {
                ProvisionError::Config(format!("Log path {} has no file name", path.display()))
            })?;
            let appender = tracing_appender::rolling::never(
                dir.unwrap_or_else(|| std::path::Path::new(".")),
                file,
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(config.path.is_none())
        .with_target(false)
        .with_level(true);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => fmt.pretty().boxed(),
        LogFormat::Json => fmt.json().boxed(),
        LogFormat::Compact => fmt.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| ProvisionError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(LogGuard { _worker: guard })
}
