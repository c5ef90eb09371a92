// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demand type registry.

use dossier_core::DossierError;
use dossier_core::model::DemandType;
use rusqlite::{ErrorCode, OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

fn demand_type_from_row(row: &Row<'_>) -> rusqlite::Result<DemandType> {
    Ok(DemandType {
        id: Some(row.get(0)?),
        type_id: row.get(1)?,
        label: row.get(2)?,
        category_code: row.get(3)?,
        url: row.get(4)?,
        app_code: row.get(5)?,
    })
}

pub async fn find_demand_type(
    db: &Database,
    type_id: &str,
) -> Result<Option<DemandType>, DossierError> {
    let type_id = type_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, type_id, label, category_code, url, app_code
                 FROM demand_type WHERE type_id = ?1",
                params![type_id],
                demand_type_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_demand_types(db: &Database) -> Result<Vec<DemandType>, DossierError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type_id, label, category_code, url, app_code
                 FROM demand_type ORDER BY type_id",
            )?;
            let rows = stmt.query_map([], demand_type_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Register a demand type. A duplicate `type_id` is a conflict.
pub async fn insert_demand_type(
    db: &Database,
    demand_type: &DemandType,
) -> Result<i64, DossierError> {
    let demand_type = demand_type.clone();
    let type_id = demand_type.type_id.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO demand_type (type_id, label, category_code, url, app_code)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    demand_type.type_id,
                    demand_type.label,
                    demand_type.category_code,
                    demand_type.url,
                    demand_type.app_code,
                ],
            );
            match result {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?
        .ok_or_else(|| DossierError::Conflict(format!("demand type `{type_id}` already exists")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::demands::tests::setup_db;

    fn make_type(type_id: &str) -> DemandType {
        DemandType {
            id: None,
            type_id: type_id.to_string(),
            label: format!("Type {type_id}"),
            category_code: Some("CAT".to_string()),
            url: None,
            app_code: None,
        }
    }

    #[tokio::test]
    async fn insert_find_and_list() {
        let (db, _dir) = setup_db().await;
        insert_demand_type(&db, &make_type("T2")).await.unwrap();
        insert_demand_type(&db, &make_type("T1")).await.unwrap();

        let found = find_demand_type(&db, "T1").await.unwrap().unwrap();
        assert_eq!(found.label, "Type T1");
        assert!(find_demand_type(&db, "nope").await.unwrap().is_none());

        let all = list_demand_types(&db).await.unwrap();
        assert_eq!(
            all.iter().map(|t| t.type_id.as_str()).collect::<Vec<_>>(),
            vec!["T1", "T2"]
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_type_id_is_conflict() {
        let (db, _dir) = setup_db().await;
        insert_demand_type(&db, &make_type("T1")).await.unwrap();
        let err = insert_demand_type(&db, &make_type("T1")).await.unwrap_err();
        assert!(matches!(err, DossierError::Conflict(_)));
        db.close().await.unwrap();
    }
}
