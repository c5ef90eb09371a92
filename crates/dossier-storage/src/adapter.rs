// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of the persistence and content store ports.

use async_trait::async_trait;
use tracing::debug;

use dossier_config::model::StorageConfig;
use dossier_core::model::{
    Demand, DemandKey, DemandQuery, DemandType, GenericStatus, Notification, NotificationContent,
    NotificationEvent, NotificationType, TemporaryStatus,
};
use dossier_core::{
    AdapterType, BackfillReport, ContentBlob, ContentBlobStore, CustomerStore, DemandStore,
    DemandTypeStore, DossierError, ErasureReport, EventStore, HealthStatus,
    NotificationContentStore, NotificationStore, PluginAdapter, ReassignReport,
    TemporaryStatusStore,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed store implementing every persistence port.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, DossierError> {
        let db = Database::open_with_config(config).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self::new(db))
    }

    /// Open a private in-memory store, used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, DossierError> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

async fn ping(db: &Database) -> Result<HealthStatus, DossierError> {
    db.connection()
        .call(|conn| conn.execute_batch("SELECT 1;"))
        .await
        .map_err(map_tr_err)?;
    Ok(HealthStatus::Healthy)
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DossierError> {
        ping(&self.db).await
    }
}

#[async_trait]
impl DemandStore for SqliteStore {
    async fn find_demand(&self, key: &DemandKey) -> Result<Option<Demand>, DossierError> {
        queries::demands::find_demand(&self.db, key).await
    }

    async fn insert_demand(&self, demand: &Demand) -> Result<Option<i64>, DossierError> {
        queries::demands::insert_demand(&self.db, demand).await
    }

    async fn update_demand(&self, demand: &Demand) -> Result<(), DossierError> {
        queries::demands::update_demand(&self.db, demand).await
    }

    async fn demands_by_customer(
        &self,
        customer_id: &str,
        demand_type_id: Option<&str>,
    ) -> Result<Vec<Demand>, DossierError> {
        queries::demands::demands_by_customer(&self.db, customer_id, demand_type_id).await
    }

    async fn search_demands(&self, query: &DemandQuery) -> Result<Vec<Demand>, DossierError> {
        queries::demands::search_demands(&self.db, query).await
    }
}

#[async_trait]
impl NotificationStore for SqliteStore {
    async fn insert_notification(
        &self,
        notification: &Notification,
    ) -> Result<i64, DossierError> {
        queries::notifications::insert_notification(&self.db, notification).await
    }

    async fn notifications_for_demand(
        &self,
        key: &DemandKey,
        notification_type: Option<NotificationType>,
    ) -> Result<Vec<Notification>, DossierError> {
        queries::notifications::notifications_for_demand(&self.db, key, notification_type).await
    }
}

#[async_trait]
impl NotificationContentStore for SqliteStore {
    async fn insert_content(&self, content: &NotificationContent) -> Result<i64, DossierError> {
        queries::contents::insert_content(&self.db, content).await
    }

    async fn contents_for_notification(
        &self,
        notification_id: i64,
    ) -> Result<Vec<NotificationContent>, DossierError> {
        queries::contents::contents_for_notification(&self.db, notification_id).await
    }
}

#[async_trait]
impl TemporaryStatusStore for SqliteStore {
    async fn list_temporary_statuses(&self) -> Result<Vec<TemporaryStatus>, DossierError> {
        queries::statuses::list_temporary_statuses(&self.db).await
    }

    async fn find_temporary_status(
        &self,
        id: i64,
    ) -> Result<Option<TemporaryStatus>, DossierError> {
        queries::statuses::find_temporary_status(&self.db, id).await
    }

    async fn insert_temporary_status(&self, label: &str) -> Result<TemporaryStatus, DossierError> {
        queries::statuses::insert_temporary_status(&self.db, label).await
    }

    async fn relabel_temporary_status(&self, id: i64, label: &str) -> Result<(), DossierError> {
        queries::statuses::relabel_temporary_status(&self.db, id, label).await
    }

    async fn delete_temporary_status(&self, id: i64) -> Result<bool, DossierError> {
        queries::statuses::delete_temporary_status(&self.db, id).await
    }

    async fn map_temporary_status(
        &self,
        id: i64,
        status: GenericStatus,
    ) -> Result<BackfillReport, DossierError> {
        queries::statuses::map_temporary_status(&self.db, id, status).await
    }

    async fn settle_temporary_status(
        &self,
        key: &DemandKey,
        notification_id: i64,
        id: i64,
    ) -> Result<Option<GenericStatus>, DossierError> {
        queries::statuses::settle_temporary_status(&self.db, key, notification_id, id).await
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert_event(&self, event: &NotificationEvent) -> Result<i64, DossierError> {
        queries::events::insert_event(&self.db, event).await
    }

    async fn events_for_demand(
        &self,
        key: &DemandKey,
    ) -> Result<Vec<NotificationEvent>, DossierError> {
        queries::events::events_for_demand(&self.db, key).await
    }
}

#[async_trait]
impl DemandTypeStore for SqliteStore {
    async fn find_demand_type(&self, type_id: &str) -> Result<Option<DemandType>, DossierError> {
        queries::demand_types::find_demand_type(&self.db, type_id).await
    }

    async fn list_demand_types(&self) -> Result<Vec<DemandType>, DossierError> {
        queries::demand_types::list_demand_types(&self.db).await
    }

    async fn insert_demand_type(&self, demand_type: &DemandType) -> Result<i64, DossierError> {
        queries::demand_types::insert_demand_type(&self.db, demand_type).await
    }
}

#[async_trait]
impl CustomerStore for SqliteStore {
    async fn reassign_customer(
        &self,
        old_customer_id: &str,
        new_customer_id: &str,
        event_date: i64,
    ) -> Result<ReassignReport, DossierError> {
        queries::customers::reassign_customer(&self.db, old_customer_id, new_customer_id, event_date)
            .await
    }

    async fn content_keys_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<String>, DossierError> {
        queries::customers::content_keys_for_customer(&self.db, customer_id).await
    }

    async fn erase_customer(&self, customer_id: &str) -> Result<ErasureReport, DossierError> {
        queries::customers::erase_customer(&self.db, customer_id).await
    }
}

/// Content blob store backed by the `content_blob` table.
#[derive(Clone)]
pub struct SqliteBlobStore {
    db: Database,
}

impl SqliteBlobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PluginAdapter for SqliteBlobStore {
    fn name(&self) -> &str {
        "sqlite-blob"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ContentStore
    }

    async fn health_check(&self) -> Result<HealthStatus, DossierError> {
        ping(&self.db).await
    }
}

#[async_trait]
impl ContentBlobStore for SqliteBlobStore {
    async fn store_blob(&self, blob: ContentBlob) -> Result<String, DossierError> {
        queries::blobs::insert_blob(&self.db, blob).await
    }

    async fn load_blob(&self, key: &str) -> Result<Option<ContentBlob>, DossierError> {
        queries::blobs::get_blob(&self.db, key).await
    }

    async fn delete_blob(&self, key: &str) -> Result<(), DossierError> {
        queries::blobs::delete_blob(&self.db, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::Store;

    #[tokio::test]
    async fn sqlite_store_is_a_full_store() {
        let store = SqliteStore::new(Database::open_in_memory().await.unwrap());
        let store: &dyn Store = &store;
        assert!(store.health_check().await.unwrap().is_healthy());
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn blob_store_shares_the_database() {
        let db = Database::open_in_memory().await.unwrap();
        let blobs = SqliteBlobStore::new(db.clone());
        let key = blobs
            .store_blob(ContentBlob {
                title: "t".to_string(),
                mime_type: "application/json".to_string(),
                compressed: false,
                data: vec![1, 2, 3],
            })
            .await
            .unwrap();
        assert!(queries::blobs::get_blob(&db, &key).await.unwrap().is_some());
    }
}
