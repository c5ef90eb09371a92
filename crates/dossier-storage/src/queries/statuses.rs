// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary status registry and the backfill it triggers.

use dossier_core::model::{DemandKey, GenericStatus, TemporaryStatus, UNDEFINED_STATUS_ID};
use dossier_core::{BackfillReport, DossierError};
use rusqlite::{ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use tracing::info;

use crate::database::{Database, map_tr_err};

fn status_from_row(row: &Row<'_>) -> rusqlite::Result<TemporaryStatus> {
    let generic: Option<i32> = row.get(2)?;
    Ok(TemporaryStatus {
        id: row.get(0)?,
        label: row.get(1)?,
        generic_status: generic.and_then(GenericStatus::from_id),
    })
}

fn not_found(id: i64) -> DossierError {
    DossierError::NotFound {
        entity: "temporary status",
        id: id.to_string(),
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

/// All entries, in insertion order.
pub async fn list_temporary_statuses(db: &Database) -> Result<Vec<TemporaryStatus>, DossierError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, label, generic_status_id FROM temporary_status ORDER BY id",
            )?;
            let rows = stmt.query_map([], status_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn find_temporary_status(
    db: &Database,
    id: i64,
) -> Result<Option<TemporaryStatus>, DossierError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, label, generic_status_id FROM temporary_status WHERE id = ?1",
                params![id],
                status_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert an unmapped entry, or return the existing entry with that label.
pub async fn insert_temporary_status(
    db: &Database,
    label: &str,
) -> Result<TemporaryStatus, DossierError> {
    let label = label.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO temporary_status (label) VALUES (?1) ON CONFLICT (label) DO NOTHING",
                params![label],
            )?;
            conn.query_row(
                "SELECT id, label, generic_status_id FROM temporary_status WHERE label = ?1",
                params![label],
                status_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn relabel_temporary_status(
    db: &Database,
    id: i64,
    label: &str,
) -> Result<(), DossierError> {
    let label = label.to_string();
    let conflict_label = label.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            match conn.execute(
                "UPDATE temporary_status SET label = ?1 WHERE id = ?2",
                params![label, id],
            ) {
                Ok(n) => Ok(Some(n)),
                Err(e) if is_constraint_violation(&e) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    match updated {
        None => Err(DossierError::Conflict(format!(
            "temporary status label `{conflict_label}` already exists"
        ))),
        Some(0) => Err(not_found(id)),
        Some(_) => Ok(()),
    }
}

pub async fn delete_temporary_status(db: &Database, id: i64) -> Result<bool, DossierError> {
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM temporary_status WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Propagate `status` to every demand and content row stamped with the
/// temporary status `id`.
///
/// A demand is pending on a temporary status when its status is undefined
/// and its latest notification produced content stamped with that id.
/// Closure dates are left untouched.
pub fn backfill(
    tx: &Transaction<'_>,
    id: i64,
    status: GenericStatus,
) -> rusqlite::Result<(usize, usize)> {
    let demands = tx.execute(
        "UPDATE demand SET status_id = ?1
         WHERE status_id = ?3
           AND EXISTS (
               SELECT 1 FROM notification_content c
               WHERE c.temporary_status_id = ?2
                 AND c.notification_id = (
                     SELECT MAX(n.id) FROM notification n
                     WHERE n.demand_id = demand.demand_id
                       AND n.demand_type_id = demand.demand_type_id
                       AND n.customer_id = demand.customer_id))",
        params![status.id(), id, UNDEFINED_STATUS_ID],
    )?;
    let contents = tx.execute(
        "UPDATE notification_content SET status_id = ?1 WHERE temporary_status_id = ?2",
        params![status.id(), id],
    )?;
    Ok((demands, contents))
}

/// Map a temporary status to a canonical status.
///
/// The registry update and, when the entry was unmapped, the backfill run in
/// one IMMEDIATE transaction: either both are committed or neither is.
pub async fn map_temporary_status(
    db: &Database,
    id: i64,
    status: GenericStatus,
) -> Result<BackfillReport, DossierError> {
    let report = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let previous: Option<Option<i32>> = tx
                .query_row(
                    "SELECT generic_status_id FROM temporary_status WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(previous) = previous else {
                return Ok(None);
            };
            let previous = previous.and_then(GenericStatus::from_id);

            tx.execute(
                "UPDATE temporary_status SET generic_status_id = ?1 WHERE id = ?2",
                params![status.id(), id],
            )?;
            let (demands_updated, contents_updated) = match previous {
                None => backfill(&tx, id, status)?,
                Some(_) => (0, 0),
            };
            tx.commit()?;

            Ok(Some(BackfillReport {
                previous,
                demands_updated,
                contents_updated,
            }))
        })
        .await
        .map_err(map_tr_err)?
        .ok_or_else(|| not_found(id))?;

    info!(
        temporary_status_id = id,
        generic_status = %status,
        demands = report.demands_updated,
        contents = report.contents_updated,
        "temporary status mapped"
    );
    Ok(report)
}

/// Apply a mapping committed after `notification_id` resolved its status.
///
/// Runs in one IMMEDIATE transaction, so it is ordered against
/// [`map_temporary_status`]: whichever commits second sees the other's rows.
pub async fn settle_temporary_status(
    db: &Database,
    key: &DemandKey,
    notification_id: i64,
    id: i64,
) -> Result<Option<GenericStatus>, DossierError> {
    let key = key.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let generic: Option<Option<i32>> = tx
                .query_row(
                    "SELECT generic_status_id FROM temporary_status WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(status) = generic.flatten().and_then(GenericStatus::from_id) else {
                return Ok(None);
            };

            tx.execute(
                "UPDATE demand SET status_id = ?1
                 WHERE demand_id = ?2 AND demand_type_id = ?3 AND customer_id = ?4
                   AND status_id = ?5",
                params![
                    status.id(),
                    key.demand_id,
                    key.demand_type_id,
                    key.customer_id,
                    UNDEFINED_STATUS_ID
                ],
            )?;
            tx.execute(
                "UPDATE notification_content SET status_id = ?1
                 WHERE notification_id = ?2 AND temporary_status_id = ?3",
                params![status.id(), notification_id, id],
            )?;
            tx.commit()?;
            Ok(Some(status))
        })
        .await
        .map_err(map_tr_err)
}
