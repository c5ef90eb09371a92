// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification content rows.
//!
//! `temporary_status_id` is persisted as `-1` when absent so that backfill
//! can select on it without a NULL check.

use dossier_core::DossierError;
use dossier_core::model::{NO_TEMPORARY_STATUS_ID, NotificationContent, NotificationType};
use rusqlite::{Row, params};

use crate::database::{Database, map_tr_err};

fn content_from_row(row: &Row<'_>) -> rusqlite::Result<NotificationContent> {
    let notification_type: String = row.get(2)?;
    let notification_type = notification_type.parse::<NotificationType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let temporary_status_id: i64 = row.get(4)?;
    Ok(NotificationContent {
        id: Some(row.get(0)?),
        notification_id: row.get(1)?,
        notification_type,
        status_id: row.get(3)?,
        temporary_status_id: (temporary_status_id != NO_TEMPORARY_STATUS_ID)
            .then_some(temporary_status_id),
        file_key: row.get(5)?,
        file_store: row.get(6)?,
    })
}

pub async fn insert_content(
    db: &Database,
    content: &NotificationContent,
) -> Result<i64, DossierError> {
    let content = content.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notification_content (notification_id, notification_type,
                     status_id, temporary_status_id, file_key, file_store)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    content.notification_id,
                    content.notification_type.to_string(),
                    content.status_id,
                    content.temporary_status_id.unwrap_or(NO_TEMPORARY_STATUS_ID),
                    content.file_key,
                    content.file_store,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn contents_for_notification(
    db: &Database,
    notification_id: i64,
) -> Result<Vec<NotificationContent>, DossierError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, notification_id, notification_type, status_id,
                        temporary_status_id, file_key, file_store
                 FROM notification_content WHERE notification_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![notification_id], content_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
