// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer reassignment.

use dossier_core::model::is_customer_id_valid;
use dossier_core::{DossierError, ReassignReport, Store};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignRequest {
    #[serde(default)]
    pub old_customer_id: String,
    #[serde(default)]
    pub new_customer_id: String,
}

impl ReassignRequest {
    pub fn validate(&self) -> Result<(&str, &str), DossierError> {
        let old = self.old_customer_id.trim();
        let new = self.new_customer_id.trim();
        if !is_customer_id_valid(Some(old)) {
            return Err(DossierError::Validation(format!(
                "invalid old customer id `{old}`"
            )));
        }
        if !is_customer_id_valid(Some(new)) {
            return Err(DossierError::Validation(format!(
                "invalid new customer id `{new}`"
            )));
        }
        if old == new {
            return Err(DossierError::Validation(
                "old and new customer ids must differ".into(),
            ));
        }
        Ok((old, new))
    }
}

/// Move every demand, notification and event of the old customer to the
/// new one, recording a MERGE event per notification.
///
/// All-or-nothing. Zero matching demands is a successful no-op.
pub async fn reassign(
    store: &dyn Store,
    request: &ReassignRequest,
    event_date: i64,
) -> Result<ReassignReport, DossierError> {
    let (old, new) = request.validate()?;
    let report = store.reassign_customer(old, new, event_date).await?;
    info!(
        old_customer_id = old,
        new_customer_id = new,
        demands = report.demands,
        notifications = report.notifications,
        "customer reassigned"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLD: &str = "3f1c2a8e-1111-4a2b-9c3d-0123456789ab";
    const NEW: &str = "9b2d7c10-2222-4e5f-8a9b-abcdefabcdef";

    fn request(old: &str, new: &str) -> ReassignRequest {
        ReassignRequest {
            old_customer_id: old.into(),
            new_customer_id: new.into(),
        }
    }

    #[test]
    fn validation() {
        assert_eq!(request(OLD, NEW).validate().unwrap(), (OLD, NEW));
        assert!(request("nope", NEW).validate().is_err());
        assert!(request(OLD, "").validate().is_err());
        assert!(request(OLD, OLD).validate().is_err());
    }

    #[test]
    fn parses_camel_case_body() {
        let req: ReassignRequest = serde_json::from_str(&format!(
            r#"{{"oldCustomerId": "{OLD}", "newCustomerId": "{NEW}"}}"#
        ))
        .unwrap();
        assert_eq!(req.old_customer_id, OLD);
    }
}
