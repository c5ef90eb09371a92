// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demand CRUD operations.

use dossier_core::DossierError;
use dossier_core::model::{Customer, Demand, DemandKey, DemandQuery};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::database::{Database, map_tr_err};

const DEMAND_COLUMNS: &str = "uid, demand_id, demand_type_id, customer_id, connection_id, \
     subtype_id, reference, status_id, creation_date, modify_date, closure_date, \
     max_steps, current_step, metadata";

pub(crate) fn demand_from_row(row: &Row<'_>) -> rusqlite::Result<Demand> {
    Ok(Demand {
        uid: Some(row.get(0)?),
        id: row.get(1)?,
        type_id: row.get(2)?,
        customer: Customer {
            id: None,
            customer_id: Some(row.get(3)?),
            connection_id: row.get(4)?,
        },
        subtype_id: row.get(5)?,
        reference: row.get(6)?,
        status_id: row.get(7)?,
        creation_date: row.get(8)?,
        modify_date: row.get(9)?,
        closure_date: row.get(10)?,
        max_steps: row.get(11)?,
        current_step: row.get(12)?,
        metadata: row.get(13)?,
    })
}

/// Fetch the demand identified by `key`.
pub async fn find_demand(db: &Database, key: &DemandKey) -> Result<Option<Demand>, DossierError> {
    let key = key.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {DEMAND_COLUMNS} FROM demand
                     WHERE demand_id = ?1 AND demand_type_id = ?2 AND customer_id = ?3"
                ),
                params![key.demand_id, key.demand_type_id, key.customer_id],
                demand_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a demand. Returns the new surrogate key, or `None` if the triple
/// is already taken.
pub async fn insert_demand(db: &Database, demand: &Demand) -> Result<Option<i64>, DossierError> {
    let demand = demand.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO demand (demand_id, demand_type_id, customer_id, connection_id,
                     subtype_id, reference, status_id, creation_date, modify_date,
                     closure_date, max_steps, current_step, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT (demand_id, demand_type_id, customer_id) DO NOTHING",
                params![
                    demand.id,
                    demand.type_id,
                    demand.customer.customer_id_or_empty(),
                    demand.customer.connection_id,
                    demand.subtype_id,
                    demand.reference,
                    demand.status_id,
                    demand.creation_date,
                    demand.modify_date,
                    demand.closure_date,
                    demand.max_steps,
                    demand.current_step,
                    demand.metadata,
                ],
            )?;
            Ok((inserted > 0).then(|| conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the mutable fields of an existing demand.
pub async fn update_demand(db: &Database, demand: &Demand) -> Result<(), DossierError> {
    let demand = demand.clone();
    let key = demand.key();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE demand SET connection_id = COALESCE(?4, connection_id),
                     subtype_id = ?5, reference = ?6, status_id = ?7, modify_date = ?8,
                     closure_date = ?9, max_steps = ?10, current_step = ?11, metadata = ?12
                 WHERE demand_id = ?1 AND demand_type_id = ?2 AND customer_id = ?3",
                params![
                    demand.id,
                    demand.type_id,
                    demand.customer.customer_id_or_empty(),
                    demand.customer.connection_id,
                    demand.subtype_id,
                    demand.reference,
                    demand.status_id,
                    demand.modify_date,
                    demand.closure_date,
                    demand.max_steps,
                    demand.current_step,
                    demand.metadata,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if updated == 0 {
        return Err(DossierError::NotFound {
            entity: "demand",
            id: format!("{}/{}/{}", key.demand_id, key.demand_type_id, key.customer_id),
        });
    }
    Ok(())
}

/// Demands of a customer, most recently modified first.
pub async fn demands_by_customer(
    db: &Database,
    customer_id: &str,
    demand_type_id: Option<&str>,
) -> Result<Vec<Demand>, DossierError> {
    let mut query = DemandQuery::for_customer(customer_id);
    query.demand_type_ids.extend(demand_type_id.map(str::to_string));
    search_demands(db, &query).await
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Demands of `query.customer_id` narrowed by type, status and content kind,
/// ordered by modification date in `query.direction`.
pub async fn search_demands(db: &Database, query: &DemandQuery) -> Result<Vec<Demand>, DossierError> {
    let mut sql = format!("SELECT {DEMAND_COLUMNS} FROM demand d WHERE d.customer_id = ?1");
    let mut values = vec![Value::Text(query.customer_id.clone())];

    if !query.demand_type_ids.is_empty() {
        let list = placeholders(values.len() + 1, query.demand_type_ids.len());
        sql.push_str(&format!(" AND d.demand_type_id IN ({list})"));
        values.extend(query.demand_type_ids.iter().cloned().map(Value::Text));
    }
    if !query.status_ids.is_empty() {
        let list = placeholders(values.len() + 1, query.status_ids.len());
        sql.push_str(&format!(" AND d.status_id IN ({list})"));
        values.extend(query.status_ids.iter().map(|id| Value::Integer(i64::from(*id))));
    }
    if let Some(kind) = query.notification_type {
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM notification n
                 JOIN notification_content c ON c.notification_id = n.id
                 WHERE n.demand_id = d.demand_id AND n.demand_type_id = d.demand_type_id
                   AND n.customer_id = d.customer_id AND c.notification_type = ?{})",
            values.len() + 1
        ));
        values.push(Value::Text(kind.to_string()));
    }
    let direction = query.direction.as_sql();
    sql.push_str(&format!(" ORDER BY d.modify_date {direction}, d.uid {direction}"));

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), demand_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::queries::contents::insert_content;
    use crate::queries::notifications::{insert_notification, tests::make_notification};
    use dossier_core::model::{NotificationContent, NotificationType, SortDirection};
    use tempfile::tempdir;

    pub(crate) async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    pub(crate) fn make_demand(id: &str, customer_id: &str) -> Demand {
        Demand {
            uid: None,
            id: id.to_string(),
            type_id: "T1".to_string(),
            subtype_id: None,
            reference: Some("REF-1".to_string()),
            creation_date: 1_700_000_000,
            modify_date: 1_700_000_000,
            closure_date: 0,
            max_steps: 4,
            current_step: 1,
            status_id: 1,
            customer: Customer {
                id: None,
                customer_id: Some(customer_id.to_string()),
                connection_id: Some("cnx-1".to_string()),
            },
            metadata: None,
        }
    }

    #[tokio::test]
    async fn insert_and_find_roundtrips() {
        let (db, _dir) = setup_db().await;
        let demand = make_demand("D1", "c-1");

        let uid = insert_demand(&db, &demand).await.unwrap();
        assert!(uid.is_some());

        let found = find_demand(&db, &demand.key()).await.unwrap().unwrap();
        assert_eq!(found.uid, uid);
        assert_eq!(found.reference.as_deref(), Some("REF-1"));
        assert_eq!(found.customer.connection_id.as_deref(), Some("cnx-1"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_insert_reports_conflict() {
        let (db, _dir) = setup_db().await;
        let demand = make_demand("D1", "c-1");
        assert!(insert_demand(&db, &demand).await.unwrap().is_some());
        assert!(insert_demand(&db, &demand).await.unwrap().is_none());

        let all = demands_by_customer(&db, "c-1", None).await.unwrap();
        assert_eq!(all.len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_demand_id_for_two_customers_is_two_rows() {
        let (db, _dir) = setup_db().await;
        insert_demand(&db, &make_demand("D1", "c-1")).await.unwrap();
        assert!(
            insert_demand(&db, &make_demand("D1", "c-2"))
                .await
                .unwrap()
                .is_some()
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_changes_mutable_fields() {
        let (db, _dir) = setup_db().await;
        let mut demand = make_demand("D1", "c-1");
        insert_demand(&db, &demand).await.unwrap();

        demand.status_id = 5;
        demand.current_step = 4;
        demand.closure_date = 1_700_000_500;
        demand.modify_date = 1_700_000_500;
        update_demand(&db, &demand).await.unwrap();

        let found = find_demand(&db, &demand.key()).await.unwrap().unwrap();
        assert_eq!(found.status_id, 5);
        assert_eq!(found.current_step, 4);
        assert_eq!(found.closure_date, 1_700_000_500);
        assert_eq!(found.creation_date, 1_700_000_000);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_missing_demand_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = update_demand(&db, &make_demand("nope", "c-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DossierError::NotFound { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn demands_by_customer_filters_type() {
        let (db, _dir) = setup_db().await;
        insert_demand(&db, &make_demand("D1", "c-1")).await.unwrap();
        let mut other = make_demand("D2", "c-1");
        other.type_id = "T2".to_string();
        insert_demand(&db, &other).await.unwrap();
        insert_demand(&db, &make_demand("D3", "c-2")).await.unwrap();

        assert_eq!(demands_by_customer(&db, "c-1", None).await.unwrap().len(), 2);
        let typed = demands_by_customer(&db, "c-1", Some("T2")).await.unwrap();
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].id, "D2");
        db.close().await.unwrap();
    }

    async fn seed_content(db: &Database, demand_id: &str, kind: NotificationType) {
        let nid = insert_notification(db, &make_notification(demand_id, "c-1", 1))
            .await
            .unwrap();
        insert_content(
            db,
            &NotificationContent {
                id: None,
                notification_id: nid,
                notification_type: kind,
                status_id: 1,
                temporary_status_id: None,
                file_key: String::new(),
                file_store: String::new(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn search_filters_statuses_and_types_together() {
        let (db, _dir) = setup_db().await;
        let mut closed = make_demand("D1", "c-1");
        closed.status_id = 8;
        insert_demand(&db, &closed).await.unwrap();
        let mut refused = make_demand("D2", "c-1");
        refused.status_id = 9;
        refused.type_id = "T2".to_string();
        insert_demand(&db, &refused).await.unwrap();
        insert_demand(&db, &make_demand("D3", "c-1")).await.unwrap();
        let mut foreign = make_demand("D4", "c-2");
        foreign.status_id = 8;
        insert_demand(&db, &foreign).await.unwrap();

        let mut query = DemandQuery::for_customer("c-1");
        query.status_ids = vec![8, 9];
        let ids: Vec<_> = search_demands(&db, &query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"D1".to_string()) && ids.contains(&"D2".to_string()));

        query.demand_type_ids = vec!["T2".to_string(), "T9".to_string()];
        let typed = search_demands(&db, &query).await.unwrap();
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].id, "D2");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn search_keeps_demands_with_matching_content_kind() {
        let (db, _dir) = setup_db().await;
        insert_demand(&db, &make_demand("D1", "c-1")).await.unwrap();
        insert_demand(&db, &make_demand("D2", "c-1")).await.unwrap();
        insert_demand(&db, &make_demand("D3", "c-1")).await.unwrap();
        seed_content(&db, "D1", NotificationType::Sms).await;
        seed_content(&db, "D2", NotificationType::MyDashboard).await;

        let mut query = DemandQuery::for_customer("c-1");
        query.notification_type = Some(NotificationType::MyDashboard);
        let found = search_demands(&db, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "D2");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn search_orders_by_modify_date_in_both_directions() {
        let (db, _dir) = setup_db().await;
        for (id, modified) in [("D1", 300), ("D2", 100), ("D3", 200)] {
            let mut demand = make_demand(id, "c-1");
            demand.modify_date = modified;
            insert_demand(&db, &demand).await.unwrap();
        }

        let mut query = DemandQuery::for_customer("c-1");
        let ids = |demands: Vec<Demand>| demands.into_iter().map(|d| d.id).collect::<Vec<_>>();
        assert_eq!(ids(search_demands(&db, &query).await.unwrap()), ["D1", "D3", "D2"]);

        query.direction = SortDirection::Asc;
        assert_eq!(ids(search_demands(&db, &query).await.unwrap()), ["D2", "D3", "D1"]);
        db.close().await.unwrap();
    }
}
