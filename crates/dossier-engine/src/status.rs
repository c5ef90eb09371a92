// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical status resolution for inbound notifications.
//!
//! Precedence, first applicable rule wins:
//! 1. the demand's own status id, when canonical;
//! 2. the my-dashboard variant's status id, when canonical;
//! 3. the my-dashboard status label, resolved through the registry;
//! 4. undefined.

use dossier_core::DossierError;
use dossier_core::model::{GenericStatus, Notification, TemporaryStatus, UNDEFINED_STATUS_ID};
use tracing::debug;

use crate::registry::StatusRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResolution {
    /// Canonical id, or [`UNDEFINED_STATUS_ID`].
    pub status_id: i32,
    /// Registry entry still awaiting an operator mapping.
    pub temporary_status: Option<TemporaryStatus>,
}

impl StatusResolution {
    pub fn resolved(status: GenericStatus) -> Self {
        Self {
            status_id: status.id(),
            temporary_status: None,
        }
    }

    pub fn undefined() -> Self {
        Self {
            status_id: UNDEFINED_STATUS_ID,
            temporary_status: None,
        }
    }

    pub fn temporary_status_id(&self) -> Option<i64> {
        self.temporary_status.as_ref().map(|status| status.id)
    }

    pub fn generic_status(&self) -> Option<GenericStatus> {
        GenericStatus::from_id(self.status_id)
    }
}

/// Rules 1 and 2. No side effects.
pub fn explicit_status(notification: &Notification) -> Option<GenericStatus> {
    let canonical = |id: Option<i32>| id.filter(|id| *id > 0).and_then(GenericStatus::from_id);

    canonical(notification.demand.status_id).or_else(|| {
        notification
            .my_dashboard
            .as_ref()
            .and_then(|dashboard| canonical(dashboard.status_id))
    })
}

/// Whether `notification` says anything about the demand's status.
///
/// Only the demand's own status id and the my-dashboard variant do; an SMS
/// or e-mail follow-up leaves the stored status as it is.
pub fn carries_status(notification: &Notification) -> bool {
    notification.demand.status_id.is_some() || notification.has_my_dashboard()
}

/// The free-text label rule 3 works on, when present and non-blank.
pub fn status_label(notification: &Notification) -> Option<&str> {
    notification
        .my_dashboard
        .as_ref()
        .and_then(|dashboard| dashboard.status_text.as_deref())
        .map(str::trim)
        .filter(|label| !label.is_empty())
}

/// Resolve the canonical status of `notification`.
///
/// Registers an unseen label as a new unmapped registry entry.
pub async fn resolve_status(
    notification: &Notification,
    registry: &StatusRegistry,
) -> Result<StatusResolution, DossierError> {
    if let Some(status) = explicit_status(notification) {
        return Ok(StatusResolution::resolved(status));
    }

    let Some(label) = status_label(notification) else {
        return Ok(StatusResolution::undefined());
    };

    let entry = registry.resolve_or_register(label).await?;
    match entry.generic_status {
        Some(status) => Ok(StatusResolution::resolved(status)),
        None => {
            debug!(
                temporary_status_id = entry.id,
                label, "status label not yet mapped"
            );
            Ok(StatusResolution {
                status_id: UNDEFINED_STATUS_ID,
                temporary_status: Some(entry),
            })
        }
    }
}
