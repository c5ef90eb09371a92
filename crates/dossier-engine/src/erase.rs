// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer data erasure.
//!
//! Content blobs go first and stop at the first failure. Blobs already
//! deleted at that point stay deleted. Rows are then removed in one
//! transaction.

use dossier_core::{ContentBlobStore, DossierError, ErasureReport, Store};
use tracing::{error, info};

pub async fn erase_customer(
    store: &dyn Store,
    blobs: &dyn ContentBlobStore,
    customer_id: &str,
) -> Result<ErasureReport, DossierError> {
    let customer_id = customer_id.trim();
    if customer_id.is_empty() {
        return Err(DossierError::Validation("customer id is mandatory".into()));
    }

    let keys = store.content_keys_for_customer(customer_id).await?;
    for (done, key) in keys.iter().enumerate() {
        if let Err(e) = blobs.delete_blob(key).await {
            error!(
                customer_id,
                deleted_blobs = done,
                file_key = %key,
                error = %e,
                "content blob deletion failed, erasure aborted"
            );
            return Err(e);
        }
    }

    let report = store.erase_customer(customer_id).await?;
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
