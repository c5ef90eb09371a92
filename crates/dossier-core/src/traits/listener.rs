// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::DossierError;
use crate::model::{Demand, Notification};

/// Callbacks fired after successful writes. Every hook defaults to a no-op.
#[async_trait]
pub trait DemandListener: Send + Sync {
    fn name(&self) -> &str;

    async fn on_demand_created(&self, _demand: &Demand) -> Result<(), DossierError> {
        Ok(())
    }

    async fn on_demand_updated(&self, _demand: &Demand) -> Result<(), DossierError> {
        Ok(())
    }

    async fn on_notification_created(
        &self,
        _notification: &Notification,
    ) -> Result<(), DossierError> {
        Ok(())
    }
}
