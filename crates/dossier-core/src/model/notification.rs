// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound notification payloads and their stored content rows.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::customer::Customer;
use super::demand::DemandKey;

/// Root wrapper of the ingestion payload: `{"notification": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    pub notification: Notification,
}

/// The demand sub-object carried by every notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub type_id: String,
    #[serde(default)]
    pub subtype_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status_id: Option<i32>,
    #[serde(default)]
    pub max_steps: i32,
    #[serde(default)]
    pub current_step: i32,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
}

impl DemandPayload {
    pub fn customer_id(&self) -> &str {
        self.customer
            .as_ref()
            .map(Customer::customer_id_or_empty)
            .unwrap_or_default()
    }

    pub fn connection_id(&self) -> &str {
        self.customer
            .as_ref()
            .map(Customer::connection_id_or_empty)
            .unwrap_or_default()
    }

    pub fn key(&self) -> DemandKey {
        DemandKey::new(self.id.clone(), self.type_id.clone(), self.customer_id())
    }
}

/// SMS sent to the customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsNotification {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Note shown to back-office agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackofficeNotification {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
}

/// An email, used both for broadcast emails and the customer email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailNotification {
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub cc: Option<String>,
    #[serde(default)]
    pub bcc: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Entry displayed on the customer's dashboard; the only variant carrying a status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyDashboardNotification {
    #[serde(default)]
    pub status_id: Option<i32>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// One ingested notification. Dates are epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: i64,
    pub demand: DemandPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoffice: Option<BackofficeNotification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broadcast_email: Vec<EmailNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_dashboard: Option<MyDashboardNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<EmailNotification>,
}

impl Notification {
    /// A notification with no variant populated.
    pub fn new(date: i64, demand: DemandPayload) -> Self {
        Self {
            id: None,
            date,
            demand,
            sms: None,
            backoffice: None,
            broadcast_email: Vec::new(),
            my_dashboard: None,
            customer_email: None,
        }
    }

    pub fn has_my_dashboard(&self) -> bool {
        self.my_dashboard.is_some()
    }

    /// Serialize every populated variant, in a fixed order.
    pub fn variants(&self) -> Result<Vec<(NotificationType, serde_json::Value)>, serde_json::Error> {
        let mut out = Vec::new();
        if let Some(sms) = &self.sms {
            out.push((NotificationType::Sms, serde_json::to_value(sms)?));
        }
        if let Some(backoffice) = &self.backoffice {
            out.push((NotificationType::Backoffice, serde_json::to_value(backoffice)?));
        }
        if !self.broadcast_email.is_empty() {
            out.push((
                NotificationType::BroadcastEmail,
                serde_json::to_value(&self.broadcast_email)?,
            ));
        }
        if let Some(dashboard) = &self.my_dashboard {
            out.push((NotificationType::MyDashboard, serde_json::to_value(dashboard)?));
        }
        if let Some(email) = &self.customer_email {
            out.push((NotificationType::CustomerEmail, serde_json::to_value(email)?));
        }
        Ok(out)
    }
}

/// Kind of a stored notification content row.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum NotificationType {
    #[strum(serialize = "SMS")]
    #[serde(rename = "SMS")]
    Sms,
    #[strum(serialize = "BACKOFFICE")]
    #[serde(rename = "BACKOFFICE")]
    Backoffice,
    #[strum(serialize = "BROADCAST_EMAIL")]
    #[serde(rename = "BROADCAST_EMAIL")]
    BroadcastEmail,
    #[strum(serialize = "MYDASHBOARD")]
    #[serde(rename = "MYDASHBOARD")]
    MyDashboard,
    #[strum(serialize = "CUSTOMER_EMAIL")]
    #[serde(rename = "CUSTOMER_EMAIL")]
    CustomerEmail,
}

/// A serialized notification variant, stored in the content blob store.
///
/// `temporary_status_id` is `None` when a canonical status was resolved at
/// write time, otherwise the registry id of the unresolved label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContent {
    #[serde(default)]
    pub id: Option<i64>,
    pub notification_id: i64,
    pub notification_type: NotificationType,
    pub status_id: i32,
    pub temporary_status_id: Option<i64>,
    /// Blob key, empty when the blob could not be stored.
    pub file_key: String,
    pub file_store: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_payload_and_ignores_unknown_fields() {
        let json = r#"{
            "notification": {
                "date": 1700000000,
                "unknownField": true,
                "demand": {
                    "id": "D1", "typeId": "T1", "statusId": 3, "maxSteps": 4, "currentStep": 2,
                    "customer": {"customerId": "c-1", "connectionId": "cnx"}
                },
                "myDashboard": {"statusId": 5, "statusText": "En cours"}
            }
        }"#;
        let envelope: NotificationEnvelope = serde_json::from_str(json).unwrap();
        let n = envelope.notification;
        assert_eq!(n.date, 1_700_000_000);
        assert_eq!(n.demand.status_id, Some(3));
        assert_eq!(n.demand.customer_id(), "c-1");
        assert!(n.has_my_dashboard());
        assert_eq!(n.my_dashboard.unwrap().status_text.as_deref(), Some("En cours"));
    }

    #[test]
    fn missing_demand_is_rejected() {
        let json = r#"{"notification": {"date": 1}}"#;
        assert!(serde_json::from_str::<NotificationEnvelope>(json).is_err());
    }

    #[test]
    fn variants_in_fixed_order() {
        let mut n = Notification::new(1, DemandPayload::default());
        n.customer_email = Some(EmailNotification::default());
        n.sms = Some(SmsNotification::default());
        n.broadcast_email = vec![EmailNotification::default(), EmailNotification::default()];
        let kinds: Vec<_> = n.variants().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationType::Sms,
                NotificationType::BroadcastEmail,
                NotificationType::CustomerEmail
            ]
        );
    }

    #[test]
    fn notification_type_names() {
        assert_eq!(NotificationType::MyDashboard.to_string(), "MYDASHBOARD");
        assert_eq!(
            "BROADCAST_EMAIL".parse::<NotificationType>().ok(),
            Some(NotificationType::BroadcastEmail)
        );
    }
}
