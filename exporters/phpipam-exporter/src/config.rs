//! Command-line and environment configuration.
//!
//! Flags are parsed once into [`Args`], validated, and turned into an
//! immutable [`ExporterConfig`] that is handed to the client and the server.

use crate::error::ExporterError;
use clap::{Parser, ValueEnum};
use phpipam_client::AuthMode;
use std::fmt;
use std::net::SocketAddr;

/// Prometheus exporter for phpIPAM subnet utilization.
#[derive(Parser, Debug)]
#[command(name = "phpipam-exporter")]
#[command(about = "Metric exporter for phpIPAM")]
#[command(version = VERSION_TEXT)]
pub struct Args {
    /// The address to listen on for HTTP requests.
    #[arg(
        long = "web.listen-address",
        env = "PHPIPAM_EXPORTER_LISTEN_ADDRESS",
        default_value = "0.0.0.0:9969"
    )]
    pub listen_address: String,

    /// Path under which metrics will be exposed.
    #[arg(
        long = "web.metrics-path",
        env = "PHPIPAM_EXPORTER_METRICS_PATH",
        default_value = "/metrics"
    )]
    pub metrics_path: String,

    /// phpIPAM API address, including the API app id.
    #[arg(
        long = "api.address",
        env = "PHPIPAM_ADDRESS",
        default_value = "http://127.0.0.1:80"
    )]
    pub api_address: String,

    /// phpIPAM API username.
    #[arg(long = "api.username", env = "PHPIPAM_USERNAME")]
    pub api_username: Option<String>,

    /// phpIPAM API password.
    #[arg(long = "api.password", env = "PHPIPAM_PASSWORD", hide_env_values = true)]
    pub api_password: Option<String>,

    /// How to authenticate against the phpIPAM API (token, basic).
    #[arg(long = "api.auth-mode", env = "PHPIPAM_AUTH_MODE", default_value = "token")]
    pub auth_mode: AuthMode,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log.level", env = "PHPIPAM_EXPORTER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format.
    #[arg(
        long = "log.format",
        env = "PHPIPAM_EXPORTER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}

/// Version line followed by the exporter description
const VERSION_TEXT: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    env!("CARGO_PKG_DESCRIPTION")
);

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Validated exporter configuration.
#[derive(Clone)]
pub struct ExporterConfig {
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    pub api_address: String,
    pub api_username: String,
    pub api_password: String,
    pub auth_mode: AuthMode,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl ExporterConfig {
    /// Validate parsed arguments
    ///
    /// # Errors
    /// [`ExporterError::InvalidConfig`] for missing credentials, an
    /// unparseable listen address or an unusable metrics path.
    pub fn from_args(args: Args) -> Result<Self, ExporterError> {
        let api_username = required(args.api_username, "api.username", "PHPIPAM_USERNAME")?;
        let api_password = required(args.api_password, "api.password", "PHPIPAM_PASSWORD")?;

        let listen_address = parse_listen_address(&args.listen_address).map_err(|e| {
            ExporterError::InvalidConfig(format!(
                "invalid listen address '{}': {}",
                args.listen_address, e
            ))
        })?;

        if !args.metrics_path.starts_with('/')
            || args.metrics_path == "/"
            || args.metrics_path == "/health"
        {
            return Err(ExporterError::InvalidConfig(format!(
                "metrics path '{}' must start with '/' and must not be '/' or '/health'",
                args.metrics_path
            )));
        }

        if args.api_address.trim().is_empty() {
            return Err(ExporterError::InvalidConfig(
                "api.address must not be empty".to_string(),
            ));
        }

        Ok(Self {
            listen_address,
            metrics_path: args.metrics_path,
            api_address: args.api_address,
            api_username,
            api_password,
            auth_mode: args.auth_mode,
            log_level: args.log_level,
            log_format: args.log_format,
        })
    }
}

/// Accepts `host:port`, or `:port` for all IPv4 interfaces
fn parse_listen_address(value: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port).parse(),
        None => value.parse(),
    }
}

fn required(value: Option<String>, flag: &str, env: &str) -> Result<String, ExporterError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ExporterError::InvalidConfig(format!(
            "please set the phpIPAM API {}: use the --{} flag or the {} environment variable",
            flag.trim_start_matches("api."),
            flag,
            env
        ))),
    }
}

// Password stays out of the startup log
impl fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("listen_address", &self.listen_address)
            .field("metrics_path", &self.metrics_path)
            .field("api_address", &self.api_address)
            .field("api_username", &self.api_username)
            .field("auth_mode", &self.auth_mode)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}
