//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name of the embedded database inside the data directory. The same
/// file is served verbatim by the storage-file snapshot export.
pub const DB_FILENAME: &str = "database.sqlite";

/// Directory name of the file vault inside the data directory.
pub const VAULT_DIRNAME: &str = "uploads";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    /// Opaque bearer token required on every route except the health
    /// probe. `None` disables the guard (development mode).
    pub api_token: Option<String>,
    /// Credentials for the seeded default admin account.
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5001)),
            data_dir: PathBuf::from("./data"),
            api_token: None,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 5001);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.api_token.is_none());
        assert_eq!(config.admin_username, "admin");
    }
}
