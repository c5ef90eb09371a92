// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The notification service: one explicit object built at startup and
//! shared by every request handler.
//!
//! Ingestion control flow: validation warnings, customer resolution,
//! status resolution, demand upsert, audit event, listeners, forwarders.
//! Forwarders see every accepted request, written or not.

use std::sync::Arc;

use dossier_core::model::{
    Demand, DemandKey, DemandQuery, DemandType, GenericStatus, Notification, NotificationEvent,
    NotificationType, StatusMessage,
};
use dossier_core::{
    ContentBlobStore, DemandListener, DossierError, ErasureReport, HealthStatus,
    IdentityResolver, NotificationForwarder, ReassignReport, Store,
};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::content::{ContentOptions, ContentWriter};
use crate::customer::{CustomerResolver, REASON_IDS_MANDATORY, WARNING_INCORRECT_IDS};
use crate::erase;
use crate::events::EventRecorder;
use crate::ingest::{DemandEngine, IngestOutcome};
use crate::merge::{self, ReassignRequest};
use crate::registry::StatusRegistry;
use crate::status::resolve_status;

pub const WARNING_MISSING_VALUE: &str = "Missing value";
pub const REASON_DEMAND_ID_MANDATORY: &str = "Notification Demand_id field is mandatory";
pub const REASON_TYPE_ID_MANDATORY: &str = "Notification Demand_type_id field is mandatory";
pub const WARNING_IDS_MANDATORY: &str = "Demand Id and Demand type Id are mandatory";
pub const REASON_TYPE_NOT_FOUND: &str = "Demand Type Id not found";

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub content: ContentOptions,
    pub connection_id_as_customer_id: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            content: ContentOptions {
                compress: false,
                file_store: "sqlite".into(),
            },
            connection_id_as_customer_id: false,
        }
    }
}

/// What ingestion of one notification produced.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub warnings: Vec<StatusMessage>,
    /// `None` when the write was skipped.
    pub outcome: Option<IngestOutcome>,
}

pub struct NotificationServiceBuilder {
    store: Arc<dyn Store>,
    blobs: Arc<dyn ContentBlobStore>,
    identity: Option<Arc<dyn IdentityResolver>>,
    forwarders: Vec<Arc<dyn NotificationForwarder>>,
    listeners: Vec<Arc<dyn DemandListener>>,
    options: ServiceOptions,
}

impl NotificationServiceBuilder {
    pub fn identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Forwarders run in registration order.
    pub fn forwarder(mut self, forwarder: Arc<dyn NotificationForwarder>) -> Self {
        self.forwarders.push(forwarder);
        self
    }

    /// Listeners run in registration order.
    pub fn listener(mut self, listener: Arc<dyn DemandListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> NotificationService {
        let content = ContentWriter::new(
            Arc::clone(&self.store),
            Arc::clone(&self.blobs),
            self.options.content.clone(),
        );
        NotificationService {
            registry: StatusRegistry::new(Arc::clone(&self.store)),
            customers: CustomerResolver::new(
                self.identity,
                self.options.connection_id_as_customer_id,
            ),
            engine: DemandEngine::new(Arc::clone(&self.store), content),
            events: EventRecorder::new(Arc::clone(&self.store)),
            demand_types: Cache::new(),
            forwarders: self.forwarders,
            listeners: self.listeners,
            store: self.store,
            blobs: self.blobs,
        }
    }
}

pub struct NotificationService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn ContentBlobStore>,
    registry: StatusRegistry,
    customers: CustomerResolver,
    engine: DemandEngine,
    events: EventRecorder,
    demand_types: Cache<String, Option<DemandType>>,
    forwarders: Vec<Arc<dyn NotificationForwarder>>,
    listeners: Vec<Arc<dyn DemandListener>>,
}

impl NotificationService {
    pub fn builder(
        store: Arc<dyn Store>,
        blobs: Arc<dyn ContentBlobStore>,
    ) -> NotificationServiceBuilder {
        NotificationServiceBuilder {
            store,
            blobs,
            identity: None,
            forwarders: Vec::new(),
            listeners: Vec::new(),
            options: ServiceOptions::default(),
        }
    }

    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    /// Reconcile one inbound notification.
    ///
    /// Warnings never fail the call. Identity and storage failures do.
    pub async fn ingest(&self, mut notification: Notification) -> Result<IngestReport, DossierError> {
        let mut warnings = self.check_notification(&notification).await?;

        let resolved = match self
            .customers
            .resolve(notification.demand.customer.take(), &mut warnings)
            .await
        {
            Ok(resolved) => resolved,
            Err(e) => {
                self.events.record_warnings(&notification, &warnings).await;
                return Err(e);
            }
        };
        notification.demand.customer = Some(resolved.customer.clone());

        if resolved.accepted && !resolved.is_usable() {
            warnings.push(StatusMessage::demand_warning(
                WARNING_INCORRECT_IDS,
                REASON_IDS_MANDATORY,
            ));
        }

        let writable = resolved.is_usable()
            && !notification.demand.id.trim().is_empty()
            && !notification.demand.type_id.trim().is_empty();

        let outcome = if writable {
            let resolution = resolve_status(&notification, &self.registry).await?;
            let outcome = self.engine.ingest(&notification, &resolution).await?;
            notification.id = Some(outcome.notification_id);
            Some(outcome)
        } else {
            debug!(
                demand_id = %notification.demand.id,
                warnings = warnings.len(),
                "notification not written"
            );
            None
        };

        self.events.record_warnings(&notification, &warnings).await;

        if let Some(outcome) = &outcome {
            self.notify_listeners(outcome, &notification).await;
        }
        self.forward(&notification).await;

        Ok(IngestReport { warnings, outcome })
    }

    async fn check_notification(
        &self,
        notification: &Notification,
    ) -> Result<Vec<StatusMessage>, DossierError> {
        let mut warnings = Vec::new();
        let demand = &notification.demand;
        if demand.id.trim().is_empty() {
            warnings.push(StatusMessage::demand_warning(
                WARNING_MISSING_VALUE,
                REASON_DEMAND_ID_MANDATORY,
            ));
        }
        if demand.type_id.trim().is_empty() {
            warnings.push(StatusMessage::demand_warning(
                WARNING_MISSING_VALUE,
                REASON_TYPE_ID_MANDATORY,
            ));
        } else if self.find_demand_type(&demand.type_id).await?.is_none() {
            warnings.push(StatusMessage::demand_warning(
                WARNING_IDS_MANDATORY,
                REASON_TYPE_NOT_FOUND,
            ));
        }
        Ok(warnings)
    }

    async fn notify_listeners(&self, outcome: &IngestOutcome, notification: &Notification) {
        for listener in &self.listeners {
            let result = if outcome.created {
                listener.on_demand_created(&outcome.demand).await
            } else {
                listener.on_demand_updated(&outcome.demand).await
            };
            if let Err(e) = result {
                warn!(listener = listener.name(), error = %e, "demand listener failed");
            }
            if let Err(e) = listener.on_notification_created(notification).await {
                warn!(listener = listener.name(), error = %e, "notification listener failed");
            }
        }
    }

    async fn forward(&self, notification: &Notification) {
        for forwarder in &self.forwarders {
            if let Err(e) = forwarder.forward(notification).await {
                warn!(forwarder = forwarder.name(), error = %e, "notification forwarding failed");
            }
        }
    }

    /// Store a producer-supplied event against its demand triple.
    pub async fn ingest_event(&self, mut event: NotificationEvent) -> Result<i64, DossierError> {
        if event.demand.id.trim().is_empty() || event.demand.type_id.trim().is_empty() {
            return Err(DossierError::Validation(
                "event demand id and demand type id are mandatory".into(),
            ));
        }
        event.demand.customer = event.demand.customer.take().map(|c| c.normalized());
        let id = self.events.record(&event).await?;
        debug!(event_id = id, demand_id = %event.demand.id, "notification event stored");
        Ok(id)
    }

    pub async fn reassign(&self, request: &ReassignRequest) -> Result<ReassignReport, DossierError> {
        let now = chrono::Utc::now().timestamp();
        merge::reassign(self.store.as_ref(), request, now).await
    }

    pub async fn erase_customer(&self, customer_id: &str) -> Result<ErasureReport, DossierError> {
        erase::erase_customer(self.store.as_ref(), self.blobs.as_ref(), customer_id).await
    }

    pub async fn demands_for_customer(&self, mut query: DemandQuery) -> Result<Vec<Demand>, DossierError> {
        query.customer_id = query.customer_id.trim().to_string();
        if query.customer_id.is_empty() {
            return Err(DossierError::Validation("customerId is mandatory".into()));
        }
        self.store.search_demands(&query).await
    }

    /// Demands of a customer whose status is one of `query.status_ids`.
    ///
    /// `category_code` adds every demand type of that category to the type
    /// filter. When the resulting type filter is still empty the category
    /// matched nothing and no demand is returned.
    pub async fn demands_by_status(
        &self,
        mut query: DemandQuery,
        category_code: Option<&str>,
    ) -> Result<Vec<Demand>, DossierError> {
        query.customer_id = query.customer_id.trim().to_string();
        if query.customer_id.is_empty() || query.status_ids.is_empty() {
            return Err(DossierError::Validation(
                "customerId and listStatus are mandatory".into(),
            ));
        }
        if let Some(code) = category_code.map(str::trim).filter(|c| !c.is_empty()) {
            let types = self.store.list_demand_types().await?;
            query.demand_type_ids.extend(
                types
                    .into_iter()
                    .filter(|t| t.category_code.as_deref() == Some(code))
                    .map(|t| t.type_id),
            );
            if query.demand_type_ids.is_empty() {
                debug!(category_code = code, "no demand type in category");
                return Ok(Vec::new());
            }
        }
        self.store.search_demands(&query).await
    }

    pub async fn notifications_for_demand(
        &self,
        key: &DemandKey,
        notification_type: Option<NotificationType>,
    ) -> Result<Vec<Notification>, DossierError> {
        if key.demand_id.trim().is_empty() || key.demand_type_id.trim().is_empty() {
            return Err(DossierError::Validation(
                "idDemand and idDemandType are mandatory".into(),
            ));
        }
        self.store.notifications_for_demand(key, notification_type).await
    }

    pub fn notification_types(&self) -> Vec<NotificationType> {
        NotificationType::iter().collect()
    }

    pub fn generic_statuses(&self) -> &[GenericStatus] {
        self.registry.generic_statuses()
    }

    pub async fn find_demand_type(&self, type_id: &str) -> Result<Option<DemandType>, DossierError> {
        let store = Arc::clone(&self.store);
        let key = type_id.to_string();
        self.demand_types
            .get_or_load(key.clone(), || async move { store.find_demand_type(&key).await })
            .await
    }

    pub async fn list_demand_types(&self) -> Result<Vec<DemandType>, DossierError> {
        self.store.list_demand_types().await
    }

    pub async fn create_demand_type(&self, mut demand_type: DemandType) -> Result<DemandType, DossierError> {
        demand_type.type_id = demand_type.type_id.trim().to_string();
        if demand_type.type_id.is_empty() {
            return Err(DossierError::Validation("demand type id is mandatory".into()));
        }
        let id = self.store.insert_demand_type(&demand_type).await?;
        self.demand_types.invalidate(&demand_type.type_id);
        demand_type.id = Some(id);
        info!(type_id = %demand_type.type_id, "demand type registered");
        Ok(demand_type)
    }

    pub async fn health(&self) -> Result<HealthStatus, DossierError> {
        let store = self.store.health_check().await?;
        if !store.is_healthy() {
            return Ok(store);
        }
        self.blobs.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::EventStore;
    use dossier_core::model::{Customer, DemandPayload, MyDashboardNotification};
    use dossier_storage::{SqliteBlobStore, SqliteStore};

    async fn service() -> (NotificationService, SqliteStore) {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let blobs = SqliteBlobStore::new(store.database().clone());
        let service = NotificationService::builder(Arc::new(store.clone()), Arc::new(blobs)).build();
        service
            .create_demand_type(DemandType {
                id: None,
                type_id: "T1".into(),
                label: "Parking permit".into(),
                category_code: None,
                url: None,
                app_code: None,
            })
            .await
            .unwrap();
        (service, store)
    }

    fn notification(type_id: &str, customer_id: Option<&str>) -> Notification {
        let mut n = Notification::new(
            1_700_000_000,
            DemandPayload {
                id: "D1".into(),
                type_id: type_id.into(),
                customer: customer_id.map(Customer::with_customer_id),
                ..DemandPayload::default()
            },
        );
        n.my_dashboard = Some(MyDashboardNotification {
            status_text: Some("En cours de traitement X".into()),
            ..MyDashboardNotification::default()
        });
        n
    }

    #[tokio::test]
    async fn clean_notification_has_no_warnings() {
        let (service, store) = service().await;
        let report = service.ingest(notification("T1", Some("c-1"))).await.unwrap();
        assert!(report.warnings.is_empty());
        let outcome = report.outcome.unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.demand.status_id, -1);
        assert!(outcome.contents[0].temporary_status_id.is_some());
        assert!(
            store
                .events_for_demand(&DemandKey::new("D1", "T1", "c-1"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn unknown_type_warns_but_still_writes() {
        let (service, store) = service().await;
        let report = service.ingest(notification("T9", Some("c-1"))).await.unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].reason, REASON_TYPE_NOT_FOUND);
        assert!(report.outcome.is_some());

        let events = store
            .events_for_demand(&DemandKey::new("D1", "T9", "c-1"))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.event_type, "GUICHET");
    }

    #[tokio::test]
    async fn missing_customer_skips_write() {
        let (service, _store) = service().await;
        let report = service.ingest(notification("T1", None)).await.unwrap();
        assert!(report.outcome.is_none());
        assert_eq!(report.warnings[0].reason, REASON_IDS_MANDATORY);
    }

    #[tokio::test]
    async fn blank_ids_warn_and_skip() {
        let (service, _store) = service().await;
        let mut n = notification("", Some("c-1"));
        n.demand.id = " ".into();
        let report = service.ingest(n).await.unwrap();
        let reasons: Vec<_> = report.warnings.iter().map(|w| w.reason.as_str()).collect();
        assert_eq!(reasons, [REASON_DEMAND_ID_MANDATORY, REASON_TYPE_ID_MANDATORY]);
        assert!(report.outcome.is_none());
    }

    #[tokio::test]
    async fn event_requires_demand_ids() {
        let (service, _store) = service().await;
        let event = NotificationEvent {
            id: None,
            event: Default::default(),
            msg_id: String::new(),
            demand: DemandPayload::default(),
            notification_date: 0,
        };
        assert!(matches!(
            service.ingest_event(event).await,
            Err(DossierError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn demand_type_cache_sees_new_types() {
        let (service, _store) = service().await;
        assert!(service.find_demand_type("T2").await.unwrap().is_none());
        service
            .create_demand_type(DemandType {
                id: None,
                type_id: "T2".into(),
                label: "Other".into(),
                category_code: None,
                url: None,
                app_code: None,
            })
            .await
            .unwrap();
        assert!(service.find_demand_type("T2").await.unwrap().is_some());
    }

    async fn closed_demand(service: &NotificationService, demand_id: &str, type_id: &str) {
        let mut n = notification(type_id, Some("c-1"));
        n.demand.id = demand_id.into();
        n.demand.status_id = Some(GenericStatus::Closed.id());
        service.ingest(n).await.unwrap();
    }

    #[tokio::test]
    async fn demands_by_status_widens_types_with_category() {
        let (service, _store) = service().await;
        service
            .create_demand_type(DemandType {
                id: None,
                type_id: "T2".into(),
                label: "Resident card".into(),
                category_code: Some("PARKING".into()),
                url: None,
                app_code: None,
            })
            .await
            .unwrap();
        closed_demand(&service, "D1", "T1").await;
        closed_demand(&service, "D2", "T2").await;
        service.ingest(notification("T2", Some("c-1"))).await.unwrap();

        let mut query = DemandQuery::for_customer("c-1");
        query.status_ids = vec![GenericStatus::Closed.id()];
        assert_eq!(service.demands_by_status(query.clone(), None).await.unwrap().len(), 2);

        let in_category = service
            .demands_by_status(query.clone(), Some("PARKING"))
            .await
            .unwrap();
        assert_eq!(in_category.len(), 1);
        assert_eq!(in_category[0].id, "D2");

        assert!(
            service
                .demands_by_status(query.clone(), Some("UNKNOWN"))
                .await
                .unwrap()
                .is_empty()
        );

        query.demand_type_ids = vec!["T1".into()];
        assert_eq!(
            service
                .demands_by_status(query, Some("UNKNOWN"))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn demands_by_status_requires_customer_and_statuses() {
        let (service, _store) = service().await;
        let no_status = DemandQuery::for_customer("c-1");
        assert!(matches!(
            service.demands_by_status(no_status, None).await,
            Err(DossierError::Validation(_))
        ));
        let mut blank_customer = DemandQuery::for_customer(" ");
        blank_customer.status_ids = vec![2];
        assert!(matches!(
            service.demands_by_status(blank_customer, None).await,
            Err(DossierError::Validation(_))
        ));
    }
}
