// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete notification service on a temp
//! SQLite database, with optional mock identity service, forwarders and
//! listeners.

use std::sync::Arc;

use dossier_config::model::StorageConfig;
use dossier_core::model::Notification;
use dossier_core::{DemandListener, DossierError, IdentityResolver, NotificationForwarder};
use dossier_engine::{ContentOptions, IngestReport, NotificationService, ServiceOptions};
use dossier_storage::{SqliteBlobStore, SqliteStore};

use crate::fixtures;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    identity: Option<Arc<dyn IdentityResolver>>,
    forwarders: Vec<Arc<dyn NotificationForwarder>>,
    listeners: Vec<Arc<dyn DemandListener>>,
    compress: bool,
    connection_id_as_customer_id: bool,
    demand_types: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            identity: None,
            forwarders: Vec::new(),
            listeners: Vec::new(),
            compress: false,
            connection_id_as_customer_id: false,
            demand_types: vec![fixtures::DEMAND_TYPE.to_string()],
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_forwarder(mut self, forwarder: Arc<dyn NotificationForwarder>) -> Self {
        self.forwarders.push(forwarder);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn DemandListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Gzip content blobs.
    pub fn with_compression(mut self) -> Self {
        self.compress = true;
        self
    }

    pub fn with_connection_id_as_customer_id(mut self) -> Self {
        self.connection_id_as_customer_id = true;
        self
    }

    /// Demand types registered before the harness is returned.
    pub fn with_demand_types(mut self, type_ids: &[&str]) -> Self {
        self.demand_types = type_ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub async fn build(self) -> Result<TestHarness, DossierError> {
        let temp_dir = tempfile::TempDir::new().map_err(DossierError::storage)?;
        let storage_config = StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
            wal_mode: true,
            busy_timeout_ms: 5000,
        };
        let store = SqliteStore::open(&storage_config).await?;
        let blobs = SqliteBlobStore::new(store.database().clone());

        let mut builder =
            NotificationService::builder(Arc::new(store.clone()), Arc::new(blobs.clone())).options(
                ServiceOptions {
                    content: ContentOptions {
                        compress: self.compress,
                        file_store: "sqlite".into(),
                    },
                    connection_id_as_customer_id: self.connection_id_as_customer_id,
                },
            );
        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }
        for forwarder in self.forwarders {
            builder = builder.forwarder(forwarder);
        }
        for listener in self.listeners {
            builder = builder.listener(listener);
        }
        let service = Arc::new(builder.build());

        for type_id in &self.demand_types {
            service
                .create_demand_type(fixtures::demand_type(type_id))
                .await?;
        }

        Ok(TestHarness {
            service,
            store,
            blobs,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment on temp storage.
pub struct TestHarness {
    pub service: Arc<NotificationService>,
    /// Direct store access for assertions.
    pub store: SqliteStore,
    pub blobs: SqliteBlobStore,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default options.
    pub async fn new() -> Result<Self, DossierError> {
        Self::builder().build().await
    }

    pub async fn ingest(&self, notification: Notification) -> Result<IngestReport, DossierError> {
        self.service.ingest(notification).await
    }
}
