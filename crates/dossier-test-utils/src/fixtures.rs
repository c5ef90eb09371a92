// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification builders shared by integration tests.

use dossier_core::model::{
    Customer, DemandPayload, DemandType, MyDashboardNotification, Notification, SmsNotification,
};

pub const CUSTOMER_A: &str = "3f1c2a8e-1111-4a2b-9c3d-0123456789ab";
pub const CUSTOMER_B: &str = "9b2d7c10-2222-4e5f-8a9b-abcdefabcdef";
pub const DEMAND_TYPE: &str = "T1";

/// An SMS notification for `demand_id` of type [`DEMAND_TYPE`].
pub fn sms_notification(demand_id: &str, customer_id: &str, date: i64) -> Notification {
    let mut notification = Notification::new(
        date,
        DemandPayload {
            id: demand_id.to_string(),
            type_id: DEMAND_TYPE.to_string(),
            max_steps: 3,
            current_step: 1,
            customer: Some(Customer::with_customer_id(customer_id)),
            ..DemandPayload::default()
        },
    );
    notification.sms = Some(SmsNotification {
        phone_number: Some("0600000000".into()),
        sender_name: Some("dossier".into()),
        message: Some(format!("update on {demand_id}")),
    });
    notification
}

/// A my-dashboard notification carrying a status id and/or label.
pub fn dashboard_notification(
    demand_id: &str,
    customer_id: &str,
    date: i64,
    status_id: Option<i32>,
    status_text: Option<&str>,
) -> Notification {
    let mut notification = sms_notification(demand_id, customer_id, date);
    notification.sms = None;
    notification.my_dashboard = Some(MyDashboardNotification {
        status_id,
        status_text: status_text.map(str::to_string),
        subject: Some("Your request".into()),
        message: Some("Status changed".into()),
        sender_name: Some("dossier".into()),
        data: None,
    });
    notification
}

pub fn demand_type(type_id: &str) -> DemandType {
    DemandType {
        id: None,
        type_id: type_id.to_string(),
        label: format!("Demand type {type_id}"),
        category_code: None,
        url: None,
        app_code: None,
    }
}

/// Wrap `notification` in the `{"notification": ...}` envelope.
pub fn envelope_json(notification: &Notification) -> serde_json::Value {
    serde_json::json!({ "notification": notification })
}
