// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind hosts, non-empty paths, and identity endpoints.

use crate::diagnostic::ConfigError;
use crate::model::DossierConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DossierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.request_body_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "server.request_body_limit must be greater than zero".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.content.file_store.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "content.file_store must not be empty".to_string(),
        });
    }

    if config.identity.enabled {
        match config.identity.endpoint.as_deref().map(str::trim) {
            None | Some("") => errors.push(ConfigError::Validation {
                message: "identity.endpoint is required when identity.enabled = true"
                    .to_string(),
            }),
            Some(endpoint) if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") => {
                errors.push(ConfigError::Validation {
                    message: format!("identity.endpoint `{endpoint}` must be an http(s) URL"),
                });
            }
            Some(_) => {}
        }
    }

    if config.identity.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "identity.timeout_secs must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
