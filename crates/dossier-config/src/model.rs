// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the dossier notification store.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level dossier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DossierConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notification content serialization settings.
    #[serde(default)]
    pub content: ContentConfig,

    /// Customer identifier handling.
    #[serde(default)]
    pub customer: CustomerConfig,

    /// External identity service.
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on every API route. `None` rejects all requests.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Maximum accepted request body, in bytes.
    #[serde(default = "default_request_body_limit")]
    pub request_body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            request_body_limit: default_request_body_limit(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_body_limit() -> usize {
    1024 * 1024
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a writer waits on a locked database, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("dossier").join("dossier.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("dossier.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Notification content configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Gzip content blobs before storing them.
    #[serde(default)]
    pub compress: bool,

    /// Name recorded as the file store of every content row.
    #[serde(default = "default_file_store")]
    pub file_store: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            compress: false,
            file_store: default_file_store(),
        }
    }
}

fn default_file_store() -> String {
    "sqlite".to_string()
}

/// Customer identifier handling.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerConfig {
    /// Use the connection id as customer id when the payload carries no customer id.
    #[serde(default)]
    pub connection_id_as_customer_id: bool,
}

/// External identity service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// When disabled, normalized customers are accepted without lookup.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the identity service.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Client application code sent with every lookup.
    #[serde(default = "default_client_code")]
    pub client_code: String,

    #[serde(default = "default_identity_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            client_code: default_client_code(),
            timeout_secs: default_identity_timeout_secs(),
        }
    }
}

fn default_client_code() -> String {
    "dossier".to_string()
}

fn default_identity_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = DossierConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.bearer_token.is_none());
        assert!(config.storage.wal_mode);
        assert!(config.storage.database_path.ends_with("dossier.db"));
        assert!(!config.identity.enabled);
        assert!(!config.customer.connection_id_as_customer_id);
        assert_eq!(config.content.file_store, "sqlite");
    }

    #[test]
    fn sections_deny_unknown_fields() {
        let result = toml::from_str::<DossierConfig>("[identity]\nendpont = \"x\"\n");
        assert!(result.is_err());
    }
}
