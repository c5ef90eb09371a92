// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence ports.
//!
//! Each trait is a narrow capability; [`Store`] bundles all of them for
//! backends that implement the whole set.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DossierError;
use crate::model::{
    Demand, DemandKey, DemandQuery, DemandType, GenericStatus, Notification, NotificationContent,
    NotificationEvent, NotificationType, TemporaryStatus,
};
use crate::traits::adapter::PluginAdapter;

/// Demand aggregate persistence.
#[async_trait]
pub trait DemandStore: Send + Sync {
    async fn find_demand(&self, key: &DemandKey) -> Result<Option<Demand>, DossierError>;

    /// Insert a new demand. Returns `Ok(None)` when a demand with the same
    /// triple already exists, so the caller can fall back to an update.
    async fn insert_demand(&self, demand: &Demand) -> Result<Option<i64>, DossierError>;

    /// Overwrite the mutable fields of the demand identified by `demand.key()`.
    async fn update_demand(&self, demand: &Demand) -> Result<(), DossierError>;

    async fn demands_by_customer(
        &self,
        customer_id: &str,
        demand_type_id: Option<&str>,
    ) -> Result<Vec<Demand>, DossierError>;

    /// Demands of `query.customer_id` matching every filter set on `query`.
    async fn search_demands(&self, query: &DemandQuery) -> Result<Vec<Demand>, DossierError>;
}

/// Immutable notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification)
    -> Result<i64, DossierError>;

    /// Notifications of a demand, oldest first.
    async fn notifications_for_demand(
        &self,
        key: &DemandKey,
        notification_type: Option<NotificationType>,
    ) -> Result<Vec<Notification>, DossierError>;
}

/// Rows describing each stored notification variant.
#[async_trait]
pub trait NotificationContentStore: Send + Sync {
    async fn insert_content(&self, content: &NotificationContent) -> Result<i64, DossierError>;

    async fn contents_for_notification(
        &self,
        notification_id: i64,
    ) -> Result<Vec<NotificationContent>, DossierError>;
}

/// Outcome of mapping a temporary status to a canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub previous: Option<GenericStatus>,
    pub demands_updated: usize,
    pub contents_updated: usize,
}

/// The temporary status registry.
#[async_trait]
pub trait TemporaryStatusStore: Send + Sync {
    /// All entries in insertion order.
    async fn list_temporary_statuses(&self) -> Result<Vec<TemporaryStatus>, DossierError>;

    async fn find_temporary_status(&self, id: i64)
    -> Result<Option<TemporaryStatus>, DossierError>;

    /// Insert an unmapped entry. An existing entry with the same label is
    /// returned unchanged.
    async fn insert_temporary_status(&self, label: &str) -> Result<TemporaryStatus, DossierError>;

    async fn relabel_temporary_status(&self, id: i64, label: &str) -> Result<(), DossierError>;

    /// Returns `false` when no entry had that id.
    async fn delete_temporary_status(&self, id: i64) -> Result<bool, DossierError>;

    /// Set the canonical status of an entry. When the entry was unmapped,
    /// demands and contents stamped with it are backfilled in the same
    /// transaction.
    async fn map_temporary_status(
        &self,
        id: i64,
        status: GenericStatus,
    ) -> Result<BackfillReport, DossierError>;

    /// Catch up a freshly written notification with a mapping that was
    /// committed after its status was resolved.
    ///
    /// When entry `id` now has a canonical status, the demand `key` (if
    /// still undefined) and the contents of `notification_id` stamped with
    /// `id` take it. Returns the canonical status applied, if any.
    async fn settle_temporary_status(
        &self,
        key: &DemandKey,
        notification_id: i64,
        id: i64,
    ) -> Result<Option<GenericStatus>, DossierError>;
}

/// Audit events.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: &NotificationEvent) -> Result<i64, DossierError>;

    async fn events_for_demand(
        &self,
        key: &DemandKey,
    ) -> Result<Vec<NotificationEvent>, DossierError>;
}

/// Demand type registry.
#[async_trait]
pub trait DemandTypeStore: Send + Sync {
    async fn find_demand_type(&self, type_id: &str) -> Result<Option<DemandType>, DossierError>;

    async fn list_demand_types(&self) -> Result<Vec<DemandType>, DossierError>;

    async fn insert_demand_type(&self, demand_type: &DemandType) -> Result<i64, DossierError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignReport {
    pub demands: usize,
    pub notifications: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErasureReport {
    pub demands: usize,
    pub notifications: usize,
    pub contents: usize,
    pub events: usize,
}

/// Customer-wide operations.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Move every demand and notification of `old_customer_id` to
    /// `new_customer_id` and record one MERGE event per moved notification,
    /// all in one transaction.
    async fn reassign_customer(
        &self,
        old_customer_id: &str,
        new_customer_id: &str,
        event_date: i64,
    ) -> Result<ReassignReport, DossierError>;

    /// Keys of every content blob owned by the customer.
    async fn content_keys_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<String>, DossierError>;

    /// Delete contents, notifications, demands and events of the customer in
    /// one transaction.
    async fn erase_customer(&self, customer_id: &str) -> Result<ErasureReport, DossierError>;
}

/// A backend implementing every persistence port.
pub trait Store:
    PluginAdapter
    + DemandStore
    + NotificationStore
    + NotificationContentStore
    + TemporaryStatusStore
    + EventStore
    + DemandTypeStore
    + CustomerStore
{
}

impl<T> Store for T where
    T: PluginAdapter
        + DemandStore
        + NotificationStore
        + NotificationContentStore
        + TemporaryStatusStore
        + EventStore
        + DemandTypeStore
        + CustomerStore
{
}
