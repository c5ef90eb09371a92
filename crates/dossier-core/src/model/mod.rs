// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model shared by every dossier crate.

pub mod ack;
pub mod customer;
pub mod demand;
pub mod demand_type;
pub mod event;
pub mod notification;
pub mod status;

pub use ack::{AckStatus, Acknowledge, AcknowledgeResponse, StatusMessage};
pub use customer::{Customer, is_connection_id_valid, is_customer_id_valid};
pub use demand::{Demand, DemandKey, DemandQuery, SortDirection};
pub use demand_type::DemandType;
pub use event::{Event, NotificationEvent};
pub use notification::{
    BackofficeNotification, DemandPayload, EmailNotification, MyDashboardNotification,
    Notification, NotificationContent, NotificationEnvelope, NotificationType, SmsNotification,
};
pub use status::{
    GenericStatus, NO_TEMPORARY_STATUS_ID, TemporaryStatus, UNDEFINED_STATUS_ID, label_matches,
    normalize_label,
};
