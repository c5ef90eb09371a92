// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::DossierError;
use crate::model::Customer;
use crate::traits::adapter::PluginAdapter;

/// Lookup against the external identity service.
#[async_trait]
pub trait IdentityResolver: PluginAdapter {
    /// Resolve a customer by connection id and/or customer id.
    ///
    /// `Ok(None)` is a definitive "not found"; `Err` means the service could
    /// not answer.
    async fn lookup(
        &self,
        connection_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> Result<Option<Customer>, DossierError>;
}
