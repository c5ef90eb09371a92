// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./dossier.toml` > `~/.config/dossier/dossier.toml` > `/etc/dossier/dossier.toml`
//! with environment variable overrides via `DOSSIER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DossierConfig;

/// Config sections addressable from the environment.
const ENV_SECTIONS: &[&str] = &["server", "storage", "content", "customer", "identity"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dossier/dossier.toml` (system-wide)
/// 3. `~/.config/dossier/dossier.toml` (user XDG config)
/// 4. `./dossier.toml` (local directory)
/// 5. `DOSSIER_*` environment variables
pub fn load_config() -> Result<DossierConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DossierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DossierConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DossierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DossierConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DossierConfig::default()))
        .merge(Toml::file("/etc/dossier/dossier.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("dossier/dossier.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("dossier.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `DOSSIER_CUSTOMER_CONNECTION_ID_AS_CUSTOMER_ID` maps to
/// `customer.connection_id_as_customer_id`.
fn env_provider() -> Env {
    Env::prefixed("DOSSIER_").map(|key| {
        let key_str = key.as_str();
        ENV_SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}
