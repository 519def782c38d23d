use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Initialize structured logging based on configuration
///
/// Supports both JSON and pretty formats with configurable log levels.
/// `RUST_LOG` takes precedence over the configured level. When a file path
/// is set, output goes to that file through a non-blocking writer; keep the
/// returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let log_level = parse_log_level(&config.level)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    let (writer, guard) = match &config.file_path {
        Some(file_path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(file_path)?);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    if config.format.as_str() == "json" {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_line_number(true);

        match writer {
            Some(writer) => registry.with(json_layer.with_writer(writer)).try_init()?,
            None => registry.with(json_layer.with_writer(std::io::stderr)).try_init()?,
        }
    } else {
        let pretty_layer = fmt::layer().pretty().with_target(true).with_file(false);

        match writer {
            Some(writer) => registry
                .with(pretty_layer.with_ansi(false).with_writer(writer))
                .try_init()?,
            None => registry.with(pretty_layer.with_writer(std::io::stderr)).try_init()?,
        }
    }

    Ok(guard)
}

/// Appender writing to `file_path`, creating its directory when missing
fn file_appender(file_path: &str) -> anyhow::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = Path::new(file_path);
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {file_path}"))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(directory)?;
    Ok(tracing_appender::rolling::never(directory, file_name))
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(anyhow::anyhow!("Invalid log level: {level}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(parse_log_level("trace").is_ok());
        assert!(parse_log_level("debug").is_ok());
        assert!(parse_log_level("INFO").is_ok());
        assert!(parse_log_level("warning").is_ok());
        assert!(parse_log_level("error").is_ok());
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("mediatree.log");

        file_appender(path.to_str().unwrap()).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
