// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification records. The full payload is kept as JSON.

use dossier_core::DossierError;
use dossier_core::model::{DemandKey, Notification, NotificationType};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Store a notification against its demand triple. Returns the new id.
pub async fn insert_notification(
    db: &Database,
    notification: &Notification,
) -> Result<i64, DossierError> {
    let key = notification.demand.key();
    let date = notification.date;
    let payload = serde_json::to_string(notification).map_err(DossierError::storage)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notification (demand_id, demand_type_id, customer_id, date, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![key.demand_id, key.demand_type_id, key.customer_id, date, payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Notifications of a demand, oldest first, optionally restricted to those
/// carrying a given variant.
pub async fn notifications_for_demand(
    db: &Database,
    key: &DemandKey,
    notification_type: Option<NotificationType>,
) -> Result<Vec<Notification>, DossierError> {
    let key = key.clone();
    let customer_id = key.customer_id.clone();
    let notification_type = notification_type.map(|t| t.to_string());
    let rows: Vec<(i64, String)> = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT n.id, n.payload FROM notification n
                 WHERE n.demand_id = ?1 AND n.demand_type_id = ?2 AND n.customer_id = ?3
                   AND (?4 IS NULL OR EXISTS (
                        SELECT 1 FROM notification_content c
                        WHERE c.notification_id = n.id AND c.notification_type = ?4))
                 ORDER BY n.date ASC, n.id ASC",
            )?;
            let rows = stmt.query_map(
                params![
                    key.demand_id,
                    key.demand_type_id,
                    key.customer_id,
                    notification_type
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(id, payload)| {
            let mut notification: Notification =
                serde_json::from_str(&payload).map_err(DossierError::storage)?;
            notification.id = Some(id);
            // Reassignment moves rows without rewriting the stored payload.
            notification
                .demand
                .customer
                .get_or_insert_with(Default::default)
                .customer_id = Some(customer_id.clone());
            Ok(notification)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::queries::contents::insert_content;
    use crate::queries::demands::tests::setup_db;
    use dossier_core::model::{
        Customer, DemandPayload, MyDashboardNotification, NotificationContent, SmsNotification,
    };

    pub(crate) fn make_notification(demand_id: &str, customer_id: &str, date: i64) -> Notification {
        let mut n = Notification::new(
            date,
            DemandPayload {
                id: demand_id.to_string(),
                type_id: "T1".to_string(),
                customer: Some(Customer::with_customer_id(customer_id)),
                ..DemandPayload::default()
            },
        );
        n.sms = Some(SmsNotification {
            message: Some("hello".to_string()),
            ..SmsNotification::default()
        });
        n
    }

    #[tokio::test]
    async fn insert_and_list_roundtrips_payload() {
        let (db, _dir) = setup_db().await;
        let n1 = make_notification("D1", "c-1", 20);
        let n2 = make_notification("D1", "c-1", 10);
        insert_notification(&db, &n1).await.unwrap();
        let id2 = insert_notification(&db, &n2).await.unwrap();

        let listed = notifications_for_demand(&db, &n1.demand.key(), None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, Some(id2));
        assert_eq!(listed[0].date, 10);
        assert_eq!(
            listed[1].sms.as_ref().and_then(|s| s.message.as_deref()),
            Some("hello")
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_variant() {
        let (db, _dir) = setup_db().await;
        let sms = make_notification("D1", "c-1", 10);
        let sms_id = insert_notification(&db, &sms).await.unwrap();
        let mut dashboard = make_notification("D1", "c-1", 20);
        dashboard.sms = None;
        dashboard.my_dashboard = Some(MyDashboardNotification::default());
        let dashboard_id = insert_notification(&db, &dashboard).await.unwrap();

        for (id, kind) in [
            (sms_id, NotificationType::Sms),
            (dashboard_id, NotificationType::MyDashboard),
        ] {
            insert_content(
                &db,
                &NotificationContent {
                    id: None,
                    notification_id: id,
                    notification_type: kind,
                    status_id: 2,
                    temporary_status_id: None,
                    file_key: String::new(),
                    file_store: "sqlite".to_string(),
                },
            )
            .await
            .unwrap();
        }

        let only_dashboard =
            notifications_for_demand(&db, &sms.demand.key(), Some(NotificationType::MyDashboard))
                .await
                .unwrap();
        assert_eq!(only_dashboard.len(), 1);
        assert_eq!(only_dashboard[0].id, Some(dashboard_id));
        db.close().await.unwrap();
    }
}
