// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary-status registry backed by a read-through cache.
//!
//! The full list of registry entries is cached under a single key and
//! rebuilt on the next read after any mutation. Readers may see a stale
//! list while a mutation is in flight.

use std::sync::Arc;

use dossier_core::model::{GenericStatus, TemporaryStatus, label_matches};
use dossier_core::{BackfillReport, DossierError, Store};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::cache::Cache;

pub struct StatusRegistry {
    store: Arc<dyn Store>,
    entries: Cache<(), Arc<Vec<TemporaryStatus>>>,
    generic: Vec<GenericStatus>,
}

impl StatusRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            entries: Cache::new(),
            generic: GenericStatus::iter().collect(),
        }
    }

    /// The canonical enumeration. Immutable, loaded once.
    pub fn generic_statuses(&self) -> &[GenericStatus] {
        &self.generic
    }

    pub async fn list(&self) -> Result<Arc<Vec<TemporaryStatus>>, DossierError> {
        let store = Arc::clone(&self.store);
        self.entries
            .get_or_load((), || async move {
                let statuses = store.list_temporary_statuses().await?;
                debug!(count = statuses.len(), "temporary status cache rebuilt");
                Ok(Arc::new(statuses))
            })
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<TemporaryStatus>, DossierError> {
        self.store.find_temporary_status(id).await
    }

    /// First cached entry whose normalized label is contained in `label`.
    ///
    /// Cache order is ascending id, so the oldest matching entry wins even
    /// when a longer, more specific label also matches.
    pub async fn resolve_label(&self, label: &str) -> Result<Option<TemporaryStatus>, DossierError> {
        let entries = self.list().await?;
        Ok(entries
            .iter()
            .find(|entry| label_matches(&entry.label, label))
            .cloned())
    }

    /// Resolve `label`, registering it as a new unmapped entry when unseen.
    pub async fn resolve_or_register(&self, label: &str) -> Result<TemporaryStatus, DossierError> {
        if let Some(found) = self.resolve_label(label).await? {
            return Ok(found);
        }
        let created = self.create(label).await?;
        info!(
            temporary_status_id = created.id,
            label = %created.label,
            "registered unseen status label"
        );
        Ok(created)
    }

    pub async fn create(&self, label: &str) -> Result<TemporaryStatus, DossierError> {
        let label = validate_label(label)?;
        let created = self.store.insert_temporary_status(label).await?;
        self.entries.invalidate_all();
        Ok(created)
    }

    pub async fn relabel(&self, id: i64, label: &str) -> Result<(), DossierError> {
        let label = validate_label(label)?;
        self.store.relabel_temporary_status(id, label).await?;
        self.entries.invalidate_all();
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DossierError> {
        let deleted = self.store.delete_temporary_status(id).await?;
        self.entries.invalidate_all();
        Ok(deleted)
    }

    /// Map an entry to a canonical status and backfill in one transaction.
    ///
    /// The cache is only invalidated once the store has committed.
    pub async fn map_label_to_generic_status(
        &self,
        id: i64,
        status: GenericStatus,
    ) -> Result<BackfillReport, DossierError> {
        let report = self.store.map_temporary_status(id, status).await?;
        self.entries.invalidate_all();
        Ok(report)
    }
}

fn validate_label(label: &str) -> Result<&str, DossierError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(DossierError::Validation(
            "temporary status label must not be empty".into(),
        ));
    }
    Ok(label)
}
