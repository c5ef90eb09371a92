// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit events synthesized from ingestion warnings.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat};
use dossier_core::model::event::{EVENT_STATUS_FAILED, EVENT_TYPE_AGENT, EVENT_TYPE_GUICHET};
use dossier_core::model::{Event, Notification, NotificationEvent, StatusMessage};
use dossier_core::{DossierError, Store};
use tracing::{debug, warn};

const SEPARATOR: &str = "-------------------------\n";

pub struct EventRecorder {
    store: Arc<dyn Store>,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Store one FAILED event summarizing `warnings`. No-op when empty.
    ///
    /// Best effort: a storage failure is logged and swallowed.
    pub async fn record_warnings(&self, notification: &Notification, warnings: &[StatusMessage]) {
        if warnings.is_empty() {
            return;
        }
        let event = warning_event(notification, warnings);
        match self.store.insert_event(&event).await {
            Ok(id) => debug!(event_id = id, demand_id = %notification.demand.id, "warning event recorded"),
            Err(e) => warn!(
                demand_id = %notification.demand.id,
                error = %e,
                "failed to record warning event"
            ),
        }
    }

    /// Store a producer-supplied event as-is.
    pub async fn record(&self, event: &NotificationEvent) -> Result<i64, DossierError> {
        self.store.insert_event(event).await
    }
}

pub fn warning_event(notification: &Notification, warnings: &[StatusMessage]) -> NotificationEvent {
    let event_type = if notification.has_my_dashboard() {
        EVENT_TYPE_GUICHET
    } else {
        EVENT_TYPE_AGENT
    };
    NotificationEvent {
        id: None,
        event: Event {
            event_date: notification.date,
            event_type: event_type.to_string(),
            status: EVENT_STATUS_FAILED.to_string(),
            message: warning_message(notification, warnings),
            reason: None,
        },
        msg_id: String::new(),
        demand: notification.demand.clone(),
        notification_date: notification.date,
    }
}

pub fn warning_message(notification: &Notification, warnings: &[StatusMessage]) -> String {
    let demand = &notification.demand;
    let date = DateTime::from_timestamp(notification.date, 0)
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| notification.date.to_string());

    let mut message = String::from("WARNINGS\n\n");
    message.push_str(&format!(
        "Demande id : {}\nDemande Type id : {}\nNotification date : {date}\n\n",
        demand.id, demand.type_id
    ));
    if demand.customer.is_some() {
        message.push_str(&format!(
            "Customer id: {}\nConnection id: {}\n",
            demand.customer_id(),
            demand.connection_id()
        ));
    }
    message.push_str(SEPARATOR);
    for warning in warnings {
        message.push_str(&format!(
            "Type : {}\nStatus : {}\nMessage : {}\nReason : {}\n",
            warning.message_type, warning.status, warning.message, warning.reason
        ));
        message.push_str(SEPARATOR);
    }
    message
}
