// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit events.

use dossier_core::DossierError;
use dossier_core::model::{Customer, DemandKey, DemandPayload, Event, NotificationEvent};
use rusqlite::{Connection, Row, params};

use crate::database::{Database, map_tr_err};

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<NotificationEvent> {
    let customer_id: String = row.get(3)?;
    Ok(NotificationEvent {
        id: Some(row.get(0)?),
        demand: DemandPayload {
            id: row.get(1)?,
            type_id: row.get(2)?,
            customer: Some(Customer::with_customer_id(customer_id)),
            ..DemandPayload::default()
        },
        notification_date: row.get(4)?,
        msg_id: row.get(5)?,
        event: Event {
            event_date: row.get(6)?,
            event_type: row.get(7)?,
            status: row.get(8)?,
            message: row.get(9)?,
            reason: row.get(10)?,
        },
    })
}

/// Insert an event on an open connection or transaction.
pub(crate) fn insert_event_on(conn: &Connection, event: &NotificationEvent) -> rusqlite::Result<i64> {
    let key = event.key();
    conn.execute(
        "INSERT INTO notification_event (demand_id, demand_type_id, customer_id,
             notification_date, msg_id, event_date, type, status, message, reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            key.demand_id,
            key.demand_type_id,
            key.customer_id,
            event.notification_date,
            event.msg_id,
            event.event.event_date,
            event.event.event_type,
            event.event.status,
            event.event.message,
            event.event.reason,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub async fn insert_event(db: &Database, event: &NotificationEvent) -> Result<i64, DossierError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| insert_event_on(conn, &event))
        .await
        .map_err(map_tr_err)
}

/// Events of a demand, oldest first.
pub async fn events_for_demand(
    db: &Database,
    key: &DemandKey,
) -> Result<Vec<NotificationEvent>, DossierError> {
    let key = key.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, demand_id, demand_type_id, customer_id, notification_date, msg_id,
                        event_date, type, status, message, reason
                 FROM notification_event
                 WHERE demand_id = ?1 AND demand_type_id = ?2 AND customer_id = ?3
                 ORDER BY event_date, id",
            )?;
            let rows = stmt.query_map(
                params![key.demand_id, key.demand_type_id, key.customer_id],
                event_from_row,
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::demands::tests::setup_db;

    #[tokio::test]
    async fn insert_and_list_events() {
        let (db, _dir) = setup_db().await;
        let key = DemandKey::new("D1", "T1", "c-1");
        let event = NotificationEvent {
            id: None,
            event: Event {
                event_date: 5,
                event_type: "AGENT".to_string(),
                status: "FAILED".to_string(),
                message: "WARNINGS".to_string(),
                reason: Some("why".to_string()),
            },
            msg_id: "m-1".to_string(),
            demand: DemandPayload {
                id: "D1".to_string(),
                type_id: "T1".to_string(),
                customer: Some(Customer::with_customer_id("c-1")),
                ..DemandPayload::default()
            },
            notification_date: 4,
        };
        let id = insert_event(&db, &event).await.unwrap();
        insert_event(&db, &NotificationEvent::merge(&key, 4, "c-0", "c-1", 9))
            .await
            .unwrap();

        let events = events_for_demand(&db, &key).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, Some(id));
        assert_eq!(events[0].event.reason.as_deref(), Some("why"));
        assert_eq!(events[0].key(), key);
        assert_eq!(events[1].event.event_type, "MERGE");
        db.close().await.unwrap();
    }
}
