// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demand upsert and open/closed transition engine.
//!
//! Writes for one (demand id, type id, customer id) triple are serialized
//! by an in-process lock. The store's unique constraint backs this up
//! across processes: a lost insert race falls back to an update.

use std::sync::Arc;

use dashmap::DashMap;
use dossier_core::model::{
    Demand, DemandKey, GenericStatus, Notification, NotificationContent, UNDEFINED_STATUS_ID,
};
use dossier_core::{DossierError, Store};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::content::ContentWriter;
use crate::status::{StatusResolution, carries_status};

/// Result of writing one notification.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub demand: Demand,
    pub created: bool,
    pub notification_id: i64,
    pub contents: Vec<NotificationContent>,
}

pub struct DemandEngine {
    store: Arc<dyn Store>,
    content: ContentWriter,
    locks: DashMap<DemandKey, Arc<Mutex<()>>>,
}

impl DemandEngine {
    pub fn new(store: Arc<dyn Store>, content: ContentWriter) -> Self {
        Self {
            store,
            content,
            locks: DashMap::new(),
        }
    }

    /// Persist the demand, then the notification, then its contents.
    ///
    /// `notification.demand.customer` must already carry the resolved
    /// customer.
    pub async fn ingest(
        &self,
        notification: &Notification,
        resolution: &StatusResolution,
    ) -> Result<IngestOutcome, DossierError> {
        let key = notification.demand.key();
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard = lock.lock().await;
            self.ingest_locked(&key, notification, resolution).await
        };

        drop(lock);
        self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        outcome
    }

    async fn ingest_locked(
        &self,
        key: &DemandKey,
        notification: &Notification,
        resolution: &StatusResolution,
    ) -> Result<IngestOutcome, DossierError> {
        let status_id = carries_status(notification).then_some(resolution.status_id);
        let (mut demand, created) = self.upsert(key, notification, status_id).await?;

        let notification_id = self.store.insert_notification(notification).await?;
        let mut contents = self
            .content
            .write_contents(notification, notification_id, resolution)
            .await;

        if let Some(temporary_id) = resolution.temporary_status_id() {
            let settled = self
                .store
                .settle_temporary_status(key, notification_id, temporary_id)
                .await?;
            if let Some(status) = settled {
                debug!(
                    demand_id = %key.demand_id,
                    temporary_status_id = temporary_id,
                    generic_status = %status,
                    "status mapped while writing, applied"
                );
                if demand.status_id == UNDEFINED_STATUS_ID {
                    demand.status_id = status.id();
                }
                for content in contents
                    .iter_mut()
                    .filter(|content| content.temporary_status_id == Some(temporary_id))
                {
                    content.status_id = status.id();
                }
            }
        }

        Ok(IngestOutcome {
            demand,
            created,
            notification_id,
            contents,
        })
    }

    async fn upsert(
        &self,
        key: &DemandKey,
        notification: &Notification,
        status_id: Option<i32>,
    ) -> Result<(Demand, bool), DossierError> {
        let existing = self
            .store
            .find_demand(key)
            .await?
            .filter(|demand| same_owner(demand, key));

        if let Some(existing) = existing {
            let updated = apply_update(existing, notification, status_id);
            self.store.update_demand(&updated).await?;
            debug!(demand_id = %key.demand_id, status_id = updated.status_id, "demand updated");
            return Ok((updated, false));
        }

        let mut demand = new_demand(notification, status_id.unwrap_or(UNDEFINED_STATUS_ID));
        match self.store.insert_demand(&demand).await? {
            Some(uid) => {
                demand.uid = Some(uid);
                info!(
                    demand_id = %key.demand_id,
                    demand_type_id = %key.demand_type_id,
                    customer_id = %key.customer_id,
                    status_id = demand.status_id,
                    "demand created"
                );
                Ok((demand, true))
            }
            None => {
                debug!(demand_id = %key.demand_id, "concurrent create detected, updating instead");
                let existing = self.store.find_demand(key).await?.ok_or_else(|| {
                    DossierError::Internal(format!(
                        "demand {} conflicted on insert but cannot be read back",
                        key.demand_id
                    ))
                })?;
                let updated = apply_update(existing, notification, status_id);
                self.store.update_demand(&updated).await?;
                Ok((updated, false))
            }
        }
    }
}

/// A stored demand whose customer id differs is a different demand.
fn same_owner(demand: &Demand, key: &DemandKey) -> bool {
    demand
        .customer
        .customer_id
        .as_deref()
        .is_none_or(|stored| stored == key.customer_id)
}

pub fn new_demand(notification: &Notification, status_id: i32) -> Demand {
    let payload = &notification.demand;
    Demand {
        uid: None,
        id: payload.id.clone(),
        type_id: payload.type_id.clone(),
        subtype_id: payload.subtype_id.clone(),
        reference: payload.reference.clone(),
        creation_date: notification.date,
        modify_date: notification.date,
        closure_date: 0,
        max_steps: payload.max_steps,
        current_step: payload.current_step,
        status_id,
        customer: payload.customer.clone().unwrap_or_default(),
        metadata: payload.metadata.clone(),
    }
}

/// Apply an update. `status_id` is `None` when the notification carries no
/// status, in which case status and closure date are kept.
pub fn apply_update(
    mut demand: Demand,
    notification: &Notification,
    status_id: Option<i32>,
) -> Demand {
    demand.current_step = notification.demand.current_step;
    demand.modify_date = notification.date;
    if let Some(status_id) = status_id {
        demand.closure_date = closure_transition(
            demand.status_id,
            status_id,
            demand.closure_date,
            notification.date,
        );
        demand.status_id = status_id;
    }
    if let Some(connection_id) = notification
        .demand
        .customer
        .as_ref()
        .and_then(|customer| customer.connection_id.clone())
    {
        demand.customer.connection_id = Some(connection_id);
    }
    demand
}

/// New closure date after moving from `old_status_id` to `new_status_id`.
///
/// Only a change of final/non-final class between two canonical statuses
/// touches the date.
pub fn closure_transition(
    old_status_id: i32,
    new_status_id: i32,
    closure_date: i64,
    date: i64,
) -> i64 {
    match (
        GenericStatus::from_id(old_status_id),
        GenericStatus::from_id(new_status_id),
    ) {
        (Some(old), Some(new)) if !old.is_final() && new.is_final() => date,
        (Some(old), Some(new)) if old.is_final() && !new.is_final() => 0,
        _ => closure_date,
    }
}
