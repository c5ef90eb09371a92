// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::DossierError;
use crate::model::Notification;

/// Downstream consumer receiving every accepted notification.
#[async_trait]
pub trait NotificationForwarder: Send + Sync {
    fn name(&self) -> &str;

    async fn forward(&self, notification: &Notification) -> Result<(), DossierError>;
}
