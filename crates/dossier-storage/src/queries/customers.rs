// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer-wide operations: reassignment (merge) and erasure.

use dossier_core::model::{DemandKey, NotificationEvent};
use dossier_core::{DossierError, ErasureReport, ReassignReport};
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::info;

use crate::database::{Database, map_tr_err};
use crate::queries::events::insert_event_on;

/// Move all demands, notifications and events of `old_customer_id` to
/// `new_customer_id`, recording one MERGE event per moved notification.
///
/// Runs in a single IMMEDIATE transaction. When no demand belongs to the old
/// customer nothing is written and an empty report is returned. A demand
/// already owned by the new customer under the same id and type aborts the
/// whole merge with [`DossierError::Conflict`].
pub async fn reassign_customer(
    db: &Database,
    old_customer_id: &str,
    new_customer_id: &str,
    event_date: i64,
) -> Result<ReassignReport, DossierError> {
    let old = old_customer_id.to_string();
    let new = new_customer_id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let demand_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM demand WHERE customer_id = ?1",
                params![old],
                |row| row.get(0),
            )?;
            if demand_count == 0 {
                return Ok(Ok(ReassignReport::default()));
            }

            let clash: Option<(String, String)> = tx
                .query_row(
                    "SELECT o.demand_id, o.demand_type_id FROM demand o
                     JOIN demand n ON n.demand_id = o.demand_id
                         AND n.demand_type_id = o.demand_type_id
                     WHERE o.customer_id = ?1 AND n.customer_id = ?2
                     ORDER BY o.uid LIMIT 1",
                    params![old, new],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            if let Some(clash) = clash {
                return Ok(Err(clash));
            }

            let moved: Vec<(DemandKey, i64)> = {
                let mut stmt = tx.prepare(
                    "SELECT demand_id, demand_type_id, date FROM notification
                     WHERE customer_id = ?1 ORDER BY id",
                )?;
                let rows = stmt.query_map(params![old], |row| {
                    Ok((
                        DemandKey::new(
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            old.clone(),
                        ),
                        row.get::<_, i64>(2)?,
                    ))
                })?;
                rows.collect::<Result<Vec<_>, _>>()?
            };

            let demands = tx.execute(
                "UPDATE demand SET customer_id = ?2 WHERE customer_id = ?1",
                params![old, new],
            )?;
            let notifications = tx.execute(
                "UPDATE notification SET customer_id = ?2 WHERE customer_id = ?1",
                params![old, new],
            )?;
            tx.execute(
                "UPDATE notification_event SET customer_id = ?2 WHERE customer_id = ?1",
                params![old, new],
            )?;
            for (key, notification_date) in &moved {
                insert_event_on(
                    &tx,
                    &NotificationEvent::merge(key, *notification_date, &old, &new, event_date),
                )?;
            }
            tx.commit()?;

            Ok(Ok(ReassignReport {
                demands,
                notifications,
            }))
        })
        .await
        .map_err(map_tr_err)?;

    let report = outcome.map_err(|(demand_id, demand_type_id)| {
        DossierError::Conflict(format!(
            "customer {new_customer_id} already owns demand {demand_id} of type {demand_type_id}"
        ))
    })?;

    if report.demands > 0 {
        info!(
            old_customer_id,
            new_customer_id,
            demands = report.demands,
            notifications = report.notifications,
            "customer reassigned"
        );
    }
    Ok(report)
}

/// Non-empty content blob keys of every notification owned by the customer.
pub async fn content_keys_for_customer(
    db: &Database,
    customer_id: &str,
) -> Result<Vec<String>, DossierError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.file_key FROM notification_content c
                 JOIN notification n ON n.id = c.notification_id
                 WHERE n.customer_id = ?1 AND c.file_key <> ''
                 ORDER BY c.id",
            )?;
            let rows = stmt.query_map(params![customer_id], |row| row.get(0))?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete contents, notifications, demands and events of the customer in
/// one transaction.
pub async fn erase_customer(db: &Database, customer_id: &str) -> Result<ErasureReport, DossierError> {
    let id = customer_id.to_string();
    let report = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let contents = tx.execute(
                "DELETE FROM notification_content WHERE notification_id IN
                     (SELECT id FROM notification WHERE customer_id = ?1)",
                params![id],
            )?;
            let notifications =
                tx.execute("DELETE FROM notification WHERE customer_id = ?1", params![id])?;
            let demands = tx.execute("DELETE FROM demand WHERE customer_id = ?1", params![id])?;
            let events = tx.execute(
                "DELETE FROM notification_event WHERE customer_id = ?1",
                params![id],
            )?;
            tx.commit()?;
            Ok(ErasureReport {
                demands,
                notifications,
                contents,
                events,
            })
        })
        .await
        .map_err(map_tr_err)?;

    info!(
        customer_id,
        demands = report.demands,
        notifications = report.notifications,
        contents = report.contents,
        events = report.events,
        "customer erased"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::contents::insert_content;
    use crate::queries::demands::tests::{make_demand, setup_db};
    use crate::queries::demands::{demands_by_customer, insert_demand};
    use crate::queries::events::events_for_demand;
    use crate::queries::notifications::{
        insert_notification, notifications_for_demand, tests::make_notification,
    };
    use dossier_core::model::{NotificationContent, NotificationType};

    async fn seed(db: &Database, demand_id: &str, customer_id: &str, file_key: &str) {
        insert_demand(db, &make_demand(demand_id, customer_id))
            .await
            .unwrap();
        let nid = insert_notification(db, &make_notification(demand_id, customer_id, 7))
            .await
            .unwrap();
        insert_content(
            db,
            &NotificationContent {
                id: None,
                notification_id: nid,
                notification_type: NotificationType::Sms,
                status_id: 1,
                temporary_status_id: None,
                file_key: file_key.to_string(),
                file_store: "sqlite".to_string(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn reassign_moves_everything_and_records_merge_events() {
        let (db, _dir) = setup_db().await;
        seed(&db, "D1", "old", "k1").await;
        seed(&db, "D2", "old", "k2").await;

        let report = reassign_customer(&db, "old", "new", 100).await.unwrap();
        assert_eq!(
            report,
            ReassignReport {
                demands: 2,
                notifications: 2
            }
        );
        assert!(demands_by_customer(&db, "old", None).await.unwrap().is_empty());
        assert_eq!(demands_by_customer(&db, "new", None).await.unwrap().len(), 2);

        let key = DemandKey::new("D1", "T1", "new");
        let notifications = notifications_for_demand(&db, &key, None).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].demand.customer_id(), "new");

        let events = events_for_demand(&db, &key).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.event_type, "MERGE");
        assert_eq!(events[0].notification_date, 7);
        assert_eq!(content_keys_for_customer(&db, "new").await.unwrap(), vec!["k1", "k2"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reassign_without_demands_is_a_no_op() {
        let (db, _dir) = setup_db().await;
        seed(&db, "D1", "someone", "k1").await;
        let report = reassign_customer(&db, "ghost", "new", 100).await.unwrap();
        assert_eq!(report, ReassignReport::default());
        assert!(demands_by_customer(&db, "new", None).await.unwrap().is_empty());
        let events = events_for_demand(&db, &DemandKey::new("D1", "T1", "someone"))
            .await
            .unwrap();
        assert!(events.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_merge_leaves_both_customers_untouched() {
        let (db, _dir) = setup_db().await;
        seed(&db, "D1", "old", "k1").await;
        seed(&db, "D2", "new", "k2").await;
        db.connection()
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER fail_merge BEFORE INSERT ON notification_event
                     WHEN NEW.type = 'MERGE'
                     BEGIN SELECT RAISE(ABORT, 'forced failure'); END;",
                )
            })
            .await
            .map_err(map_tr_err)
            .unwrap();

        assert!(reassign_customer(&db, "old", "new", 100).await.is_err());

        let old = demands_by_customer(&db, "old", None).await.unwrap();
        let new = demands_by_customer(&db, "new", None).await.unwrap();
        assert_eq!(old.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["D1"]);
        assert_eq!(new.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["D2"]);
        let old_notifications =
            notifications_for_demand(&db, &DemandKey::new("D1", "T1", "old"), None)
                .await
                .unwrap();
        assert_eq!(old_notifications.len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn shared_demand_makes_merge_a_conflict() {
        let (db, _dir) = setup_db().await;
        seed(&db, "D1", "old", "k1").await;
        seed(&db, "D2", "old", "k2").await;
        seed(&db, "D1", "new", "k3").await;

        let err = reassign_customer(&db, "old", "new", 100).await.unwrap_err();
        match err {
            DossierError::Conflict(message) => {
                assert!(message.contains("new"), "{message}");
                assert!(message.contains("D1"), "{message}");
            }
            other => panic!("expected a conflict, got {other:?}"),
        }

        assert_eq!(demands_by_customer(&db, "old", None).await.unwrap().len(), 2);
        assert_eq!(demands_by_customer(&db, "new", None).await.unwrap().len(), 1);
        assert_eq!(content_keys_for_customer(&db, "old").await.unwrap(), vec!["k1", "k2"]);
        let events = events_for_demand(&db, &DemandKey::new("D1", "T1", "old"))
            .await
            .unwrap();
        assert!(events.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn erase_removes_customer_rows_only() {
        let (db, _dir) = setup_db().await;
        seed(&db, "D1", "gone", "k1").await;
        seed(&db, "D2", "kept", "k2").await;

        let report = erase_customer(&db, "gone").await.unwrap();
        assert_eq!(report.demands, 1);
        assert_eq!(report.notifications, 1);
        assert_eq!(report.contents, 1);

        assert!(demands_by_customer(&db, "gone", None).await.unwrap().is_empty());
        assert!(content_keys_for_customer(&db, "gone").await.unwrap().is_empty());
        assert_eq!(content_keys_for_customer(&db, "kept").await.unwrap(), vec!["k2"]);
        db.close().await.unwrap();
    }
}
