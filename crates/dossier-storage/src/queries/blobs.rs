// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content blobs stored in the `content_blob` table.

use dossier_core::{ContentBlob, DossierError};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Store a blob under a fresh key and return the key.
pub async fn insert_blob(db: &Database, blob: ContentBlob) -> Result<String, DossierError> {
    let key = uuid::Uuid::new_v4().to_string();
    let stored_key = key.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO content_blob (key, title, mime_type, size, compressed, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    stored_key,
                    blob.title,
                    blob.mime_type,
                    blob.data.len() as i64,
                    blob.compressed,
                    blob.data,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(key)
}

pub async fn get_blob(db: &Database, key: &str) -> Result<Option<ContentBlob>, DossierError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT title, mime_type, compressed, data FROM content_blob WHERE key = ?1",
                params![key],
                |row| {
                    Ok(ContentBlob {
                        title: row.get(0)?,
                        mime_type: row.get(1)?,
                        compressed: row.get(2)?,
                        data: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_blob(db: &Database, key: &str) -> Result<(), DossierError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM content_blob WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
