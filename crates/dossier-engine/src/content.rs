// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialization of notification variants into the content blob store.
//!
//! Each variant is written independently. A variant whose blob cannot be
//! stored is still recorded, with an empty file key.

use std::io::{Read, Write};
use std::sync::Arc;

use dossier_core::model::{Notification, NotificationContent, NotificationType};
use dossier_core::{ContentBlob, ContentBlobStore, DossierError, Store};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{error, warn};

use crate::status::StatusResolution;

pub const CONTENT_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub compress: bool,
    pub file_store: String,
}

pub struct ContentWriter {
    store: Arc<dyn Store>,
    blobs: Arc<dyn ContentBlobStore>,
    options: ContentOptions,
}

impl ContentWriter {
    pub fn new(
        store: Arc<dyn Store>,
        blobs: Arc<dyn ContentBlobStore>,
        options: ContentOptions,
    ) -> Self {
        Self {
            store,
            blobs,
            options,
        }
    }

    /// Write one content row per variant present on `notification`.
    ///
    /// Every row carries the same status pair. Returns the rows that were
    /// persisted; failures are logged and skipped.
    pub async fn write_contents(
        &self,
        notification: &Notification,
        notification_id: i64,
        resolution: &StatusResolution,
    ) -> Vec<NotificationContent> {
        let variants = match notification.variants() {
            Ok(variants) => variants,
            Err(e) => {
                error!(notification_id, error = %e, "failed to serialize notification variants");
                return Vec::new();
            }
        };

        let mut written = Vec::with_capacity(variants.len());
        for (notification_type, value) in variants {
            let file_key = self
                .store_variant(notification, notification_type, &value)
                .await;
            let mut content = NotificationContent {
                id: None,
                notification_id,
                notification_type,
                status_id: resolution.status_id,
                temporary_status_id: resolution.temporary_status_id(),
                file_key,
                file_store: self.options.file_store.clone(),
            };
            match self.store.insert_content(&content).await {
                Ok(id) => {
                    content.id = Some(id);
                    written.push(content);
                }
                Err(e) => error!(
                    notification_id,
                    notification_type = %notification_type,
                    error = %e,
                    "failed to record notification content"
                ),
            }
        }
        written
    }

    async fn store_variant(
        &self,
        notification: &Notification,
        notification_type: NotificationType,
        value: &serde_json::Value,
    ) -> String {
        let blob = match self.encode(notification, notification_type, value) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(notification_type = %notification_type, error = %e, "failed to encode content");
                return String::new();
            }
        };
        match self.blobs.store_blob(blob).await {
            Ok(key) => key,
            Err(e) => {
                warn!(
                    demand_id = %notification.demand.id,
                    notification_type = %notification_type,
                    error = %e,
                    "content store write failed"
                );
                String::new()
            }
        }
    }

    fn encode(
        &self,
        notification: &Notification,
        notification_type: NotificationType,
        value: &serde_json::Value,
    ) -> Result<ContentBlob, DossierError> {
        let json = strip_control_chars(&serde_json::to_string(value)?);
        let data = if self.options.compress {
            gzip(json.as_bytes())?
        } else {
            json.into_bytes()
        };
        Ok(ContentBlob {
            title: blob_title(notification, notification_type),
            mime_type: CONTENT_MIME_TYPE.to_string(),
            compressed: self.options.compress,
            data,
        })
    }
}

/// `<demandId>_<TYPE>_<connectionId>`
pub fn blob_title(notification: &Notification, notification_type: NotificationType) -> String {
    format!(
        "{}_{}_{}",
        notification.demand.id,
        notification_type,
        notification.demand.connection_id()
    )
}

pub fn strip_control_chars(input: &str) -> String {
    input.chars().filter(|c| !c.is_control()).collect()
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>, DossierError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .and_then(|()| encoder.finish())
        .map_err(|e| DossierError::ContentStore {
            message: format!("gzip failed: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Decode a stored blob back into the variant's JSON value.
pub fn decode_blob(blob: &ContentBlob) -> Result<serde_json::Value, DossierError> {
    if !blob.compressed {
        return Ok(serde_json::from_slice(&blob.data)?);
    }
    let mut json = String::new();
    GzDecoder::new(blob.data.as_slice())
        .read_to_string(&mut json)
        .map_err(|e| DossierError::ContentStore {
            message: format!("gunzip failed: {e}"),
            source: Some(Box::new(e)),
        })?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dossier_core::model::{
        Customer, DemandPayload, SmsNotification, TemporaryStatus,
    };
    use dossier_core::{AdapterType, HealthStatus, NotificationContentStore, NotificationStore, PluginAdapter};
    use dossier_storage::{SqliteBlobStore, SqliteStore};

    struct BrokenBlobs;

    #[async_trait]
    impl PluginAdapter for BrokenBlobs {
        fn name(&self) -> &str {
            "broken"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 1)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::ContentStore
        }
        async fn health_check(&self) -> Result<HealthStatus, DossierError> {
            Ok(HealthStatus::Unhealthy("broken".into()))
        }
    }

    #[async_trait]
    impl ContentBlobStore for BrokenBlobs {
        async fn store_blob(&self, _blob: ContentBlob) -> Result<String, DossierError> {
            Err(DossierError::ContentStore {
                message: "disk full".into(),
                source: None,
            })
        }
        async fn load_blob(&self, _key: &str) -> Result<Option<ContentBlob>, DossierError> {
            Ok(None)
        }
        async fn delete_blob(&self, _key: &str) -> Result<(), DossierError> {
            Ok(())
        }
    }

    fn sample() -> Notification {
        let mut n = Notification::new(
            1_700_000_000,
            DemandPayload {
                id: "D1".into(),
                type_id: "T1".into(),
                customer: Some(Customer {
                    customer_id: Some("c-1".into()),
                    connection_id: Some("cnx".into()),
                    ..Customer::default()
                }),
                ..DemandPayload::default()
            },
        );
        n.sms = Some(SmsNotification {
            message: Some("line one\nline two\u{7}".into()),
            ..SmsNotification::default()
        });
        n.customer_email = Some(Default::default());
        n
    }

    fn options(compress: bool) -> ContentOptions {
        ContentOptions {
            compress,
            file_store: "sqlite".into(),
        }
    }

    #[test]
    fn title_and_control_chars() {
        assert_eq!(blob_title(&sample(), NotificationType::Sms), "D1_SMS_cnx");
        assert_eq!(strip_control_chars("a\tb\u{0}c\n"), "abc");
    }

    #[tokio::test]
    async fn writes_one_row_per_variant_with_shared_status() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let blobs = SqliteBlobStore::new(store.database().clone());
        let writer = ContentWriter::new(
            Arc::new(store.clone()),
            Arc::new(blobs.clone()),
            options(true),
        );

        let n = sample();
        let notification_id = store.insert_notification(&n).await.unwrap();
        let resolution = StatusResolution {
            status_id: -1,
            temporary_status: Some(TemporaryStatus {
                id: 4,
                label: "x".into(),
                generic_status: None,
            }),
        };
        let written = writer.write_contents(&n, notification_id, &resolution).await;
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|c| c.temporary_status_id == Some(4) && c.status_id == -1));

        let stored = store.contents_for_notification(notification_id).await.unwrap();
        assert_eq!(stored.len(), 2);
        let blob = blobs.load_blob(&stored[0].file_key).await.unwrap().unwrap();
        assert!(blob.compressed);
        assert_eq!(blob.title, "D1_SMS_cnx");
        let value = decode_blob(&blob).unwrap();
        assert_eq!(value["message"], "line one\nline two\u{7}");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn blob_failure_records_empty_key() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let writer = ContentWriter::new(Arc::new(store.clone()), Arc::new(BrokenBlobs), options(false));
        let n = sample();
        let notification_id = store.insert_notification(&n).await.unwrap();

        let written = writer
            .write_contents(&n, notification_id, &StatusResolution::undefined())
            .await;
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|c| c.file_key.is_empty()));
        assert!(logs_contain("content store write failed"));
    }
}
