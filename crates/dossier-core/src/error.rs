// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the dossier notification store.

use thiserror::Error;

/// The primary error type used across all dossier ports and core operations.
#[derive(Debug, Error)]
pub enum DossierError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Request content that could not be parsed or mapped onto the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Semantically invalid request values (ill-formed customer ids, empty labels).
    #[error("validation error: {0}")]
    Validation(String),

    /// The identity service failed to answer (network error, 5xx, bad payload).
    ///
    /// A definitive "customer not found" answer is NOT an error; it is
    /// reported as `Ok(None)` by the resolver.
    #[error("identity service error: {message}")]
    Identity {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The content blob store rejected a read, write, or delete.
    #[error("content store error: {message}")]
    ContentStore {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DossierError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Returns `true` for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput(_) | Self::Validation(_) | Self::NotFound { .. } | Self::Conflict(_)
        )
    }
}

impl From<serde_json::Error> for DossierError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}
