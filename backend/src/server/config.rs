//! Application settings and the HTTP server configuration object.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use recipe_backend::domain::IMAGE_MAX_BYTES;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_CONNECT_ATTEMPTS: u32 = 5;

/// Largest JSON body accepted; base64 images grow by a third on the wire.
pub const JSON_BODY_LIMIT: usize = IMAGE_MAX_BYTES * 2;

/// Settings loaded from `RECIPES_*` environment variables and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Public site root used for media URLs, page links and short links.
    pub base_url: Option<String>,
    /// Directory holding uploaded images.
    pub media_root: Option<PathBuf>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Tries made to reach PostgreSQL at start-up.
    pub pool_connect_attempts: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

/// Settings that cannot be turned into a running server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was supplied.
    #[error("RECIPES_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// The host is not an IP address.
    #[error("invalid bind host {host:?}: {message}")]
    InvalidHost { host: String, message: String },
    /// The public base URL is not an absolute http(s) URL.
    #[error("invalid base url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl AppSettings {
    /// Socket address built from `host` and `port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip: IpAddr = host.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::InvalidHost {
                host: host.to_owned(),
                message: err.to_string(),
            }
        })?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Configured database URL.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Public site root, defaulting to the local listener.
    pub fn base_url(&self) -> Result<&str, SettingsError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let invalid = |message: String| SettingsError::InvalidBaseUrl {
            url: raw.to_owned(),
            message,
        };
        let parsed = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        Ok(raw)
    }

    /// Media directory, defaulting to `./media`.
    pub fn media_root(&self) -> &Path {
        self.media_root
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MEDIA_ROOT))
    }

    /// Pool size, defaulting to ten connections.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Start-up connection attempts, defaulting to five.
    pub fn pool_connect_attempts(&self) -> u32 {
        self.pool_connect_attempts
            .unwrap_or(DEFAULT_POOL_CONNECT_ATTEMPTS)
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) json_limit: usize,
}

impl ServerConfig {
    /// Listen on `bind_addr` with the default body limit.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            json_limit: JSON_BODY_LIMIT,
        }
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by server tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
