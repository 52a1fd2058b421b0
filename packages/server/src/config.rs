//! Server configuration from the environment.

use std::path::PathBuf;

use crime_browser_database::db;

/// Default bind address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8000;

/// Default static file directory when `STATIC_DIR` is unset.
pub const DEFAULT_STATIC_DIR: &str = "app/dist";

/// Everything needed to start the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: String,
    /// TCP port.
    pub port: u16,
    /// `DuckDB` file holding catalog and incidents.
    pub database_path: PathBuf,
    /// Frontend build served at `/`.
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `CRIME_BROWSER_DB`, and `STATIC_DIR`,
    /// falling back to defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let static_dir = std::env::var("STATIC_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        Self {
            bind_addr,
            port,
            database_path: db::path_from_env(),
            static_dir,
        }
    }
}
