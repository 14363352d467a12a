//! Logging setup.

use crate::config::LogFormat;
use crate::error::ExporterError;
use tracing_subscriber::EnvFilter;

/// Build the log filter: `RUST_LOG` directives win over `--log.level`
pub fn build_filter(level: &str) -> Result<EnvFilter, ExporterError> {
    let directive = format!("phpipam_exporter={level},phpipam_client={level},tower_http={level}");
    let base = EnvFilter::try_new(&directive)
        .map_err(|e| ExporterError::Logging(format!("invalid log level '{}': {}", level, e)))?;

    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) if !env.is_empty() => EnvFilter::try_new(format!("{directive},{env}"))
            .map_err(|e| ExporterError::Logging(format!("invalid RUST_LOG: {}", e))),
        _ => Ok(base),
    }
}

/// Install the global tracing subscriber
pub fn init(level: &str, format: LogFormat) -> Result<(), ExporterError> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    result.map_err(|e| ExporterError::Logging(e.to_string()))
}
