//! Server configuration from the command line and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use quill_auth::TenantRegistry;
use zeroize::Zeroize;

use crate::error::ServerError;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Quill multi-tenant log ingestion and query server.
#[derive(Parser, Clone)]
#[command(name = "quill-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file; `:memory:` keeps logs in memory only.
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// JSON object mapping each tenant identifier to its secret.
    #[arg(long, env = "TENANT_SECRET_KEYS", hide_env_values = true)]
    pub tenant_secrets: String,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Validated, immutable server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    bind_addr: SocketAddr,
    database_path: PathBuf,
    registry: Arc<TenantRegistry>,
    log_format: LogFormat,
}

impl ServerConfig {
    /// Validates command-line arguments and builds the tenant registry.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the database path is empty or the
    /// tenant secrets are not a non-empty JSON object of non-empty strings.
    pub fn from_cli(mut cli: Cli) -> Result<Self, ServerError> {
        let registry = registry_from_secrets(&mut cli.tenant_secrets);

        if cli.database_path.as_os_str().is_empty() {
            return Err(ServerError::Config("DATABASE_PATH is empty".to_string()));
        }
        let registry = registry?;

        Ok(Self {
            bind_addr: SocketAddr::new(cli.host, cli.port),
            database_path: cli.database_path,
            registry: Arc::new(registry),
            log_format: cli.log_format,
        })
    }

    /// Address the HTTP server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// SQLite database location.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Shared tenant registry.
    #[must_use]
    pub fn registry(&self) -> Arc<TenantRegistry> {
        Arc::clone(&self.registry)
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Builds the registry from the raw secrets mapping, then wipes the
/// plaintext whether or not it parsed.
fn registry_from_secrets(raw: &mut String) -> Result<TenantRegistry, ServerError> {
    let registry = TenantRegistry::from_json(raw);
    raw.zeroize();
    registry.map_err(ServerError::from)
}
