// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit events attached to demands.

use serde::{Deserialize, Serialize};

use super::customer::Customer;
use super::demand::DemandKey;
use super::notification::DemandPayload;

/// Event raised by a notification carrying a dashboard variant.
pub const EVENT_TYPE_GUICHET: &str = "GUICHET";
/// Event raised by any other notification.
pub const EVENT_TYPE_AGENT: &str = "AGENT";
/// Event recorded for each notification moved by a customer merge.
pub const EVENT_TYPE_MERGE: &str = "MERGE";

pub const EVENT_STATUS_FAILED: &str = "FAILED";
pub const EVENT_STATUS_WARNING: &str = "WARNING";
pub const EVENT_STATUS_SUCCESS: &str = "SUCCESS";

/// The event body: what happened, when, and how it ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub event_date: i64,
    #[serde(default, rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// An event linked to a demand, as ingested or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub event: Event,
    #[serde(default)]
    pub msg_id: String,
    pub demand: DemandPayload,
    #[serde(default)]
    pub notification_date: i64,
}

impl NotificationEvent {
    /// The demand triple this event is stored against.
    pub fn key(&self) -> DemandKey {
        self.demand.key()
    }

    /// Audit event for one notification moved from `old_customer_id` to
    /// `new_customer_id`.
    pub fn merge(
        key: &DemandKey,
        notification_date: i64,
        old_customer_id: &str,
        new_customer_id: &str,
        event_date: i64,
    ) -> Self {
        Self {
            id: None,
            event: Event {
                event_date,
                event_type: EVENT_TYPE_MERGE.to_string(),
                status: EVENT_STATUS_SUCCESS.to_string(),
                message: format!(
                    "Notification reassigned from customer {old_customer_id} to customer {new_customer_id}"
                ),
                reason: None,
            },
            msg_id: String::new(),
            demand: DemandPayload {
                id: key.demand_id.clone(),
                type_id: key.demand_type_id.clone(),
                customer: Some(Customer::with_customer_id(new_customer_id)),
                ..DemandPayload::default()
            },
            notification_date,
        }
    }
}
