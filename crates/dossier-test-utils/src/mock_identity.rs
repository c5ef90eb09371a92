// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted identity service for deterministic tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use dossier_core::model::Customer;
use dossier_core::{AdapterType, DossierError, HealthStatus, IdentityResolver, PluginAdapter};

/// Resolves identifiers registered with [`MockIdentityResolver::with_identity`].
///
/// Either a connection id or a customer id may be registered; a lookup
/// succeeds if any identifier it carries is known. Unknown identifiers
/// resolve to "not found".
#[derive(Default)]
pub struct MockIdentityResolver {
    identities: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `known_id` (connection id or customer id) to `customer_id`.
    pub fn with_identity(self, known_id: &str, customer_id: &str) -> Self {
        self.add_identity(known_id, customer_id);
        self
    }

    pub fn add_identity(&self, known_id: &str, customer_id: &str) {
        if let Ok(mut identities) = self.identities.lock() {
            identities.insert(known_id.to_string(), customer_id.to_string());
        }
    }

    /// Make every subsequent lookup fail with an identity error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockIdentityResolver {
    fn name(&self) -> &str {
        "mock-identity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Identity
    }

    async fn health_check(&self) -> Result<HealthStatus, DossierError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl IdentityResolver for MockIdentityResolver {
    async fn lookup(
        &self,
        connection_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> Result<Option<Customer>, DossierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DossierError::Identity {
                message: "mock identity service unavailable".into(),
                source: None,
            });
        }
        let identities = self
            .identities
            .lock()
            .map_err(|e| DossierError::Internal(format!("mock identity lock poisoned: {e}")))?;
        let found = [connection_id, customer_id]
            .into_iter()
            .flatten()
            .find_map(|id| identities.get(id));
        Ok(found.map(|resolved| Customer {
            id: None,
            customer_id: Some(resolved.clone()),
            connection_id: connection_id.map(str::to_string),
        }))
    }
}
