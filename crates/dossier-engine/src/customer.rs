// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer identity gating for inbound notifications.

use std::sync::Arc;

use dossier_core::model::ack::{MESSAGE_STATUS_ERROR, MESSAGE_TYPE_DEMAND};
use dossier_core::model::{Customer, StatusMessage, is_connection_id_valid, is_customer_id_valid};
use dossier_core::{DossierError, IdentityResolver};
use tracing::{debug, error, warn};

pub const WARNING_INCORRECT_IDS: &str = "Incorrect User Ids";
pub const REASON_IDS_MANDATORY: &str = "Valid user connection id or customer id is mandatory";
pub const REASON_NOT_FOUND: &str = "User not found in the identityStore";
pub const REASON_LOOKUP_FAILED: &str = "An error occured while retrieving user from identityStore";

/// Outcome of [`CustomerResolver::resolve`].
///
/// A rejected customer is still returned so the audit trail can name the
/// identifiers the producer sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCustomer {
    pub customer: Customer,
    pub accepted: bool,
}

impl ResolvedCustomer {
    fn accepted(customer: Customer) -> Self {
        Self {
            customer,
            accepted: true,
        }
    }

    fn rejected(customer: Customer) -> Self {
        Self {
            customer,
            accepted: false,
        }
    }

    /// Accepted and carrying a non-empty customer id.
    pub fn is_usable(&self) -> bool {
        self.accepted && !self.customer.customer_id_or_empty().is_empty()
    }
}

pub struct CustomerResolver {
    identity: Option<Arc<dyn IdentityResolver>>,
    connection_id_as_customer_id: bool,
}

impl CustomerResolver {
    pub fn new(
        identity: Option<Arc<dyn IdentityResolver>>,
        connection_id_as_customer_id: bool,
    ) -> Self {
        Self {
            identity,
            connection_id_as_customer_id,
        }
    }

    pub fn has_identity_service(&self) -> bool {
        self.identity.is_some()
    }

    /// Normalize and, when an identity service is configured, consolidate
    /// the payload customer.
    ///
    /// Rejections push a warning onto `warnings`. A failing lookup pushes an
    /// error-class warning and is then returned as [`DossierError::Identity`].
    pub async fn resolve(
        &self,
        raw: Option<Customer>,
        warnings: &mut Vec<StatusMessage>,
    ) -> Result<ResolvedCustomer, DossierError> {
        let mut customer = raw.unwrap_or_default().normalized();

        if self.connection_id_as_customer_id
            && customer.customer_id.is_none()
            && customer.id.is_none()
            && customer.connection_id.is_some()
        {
            customer.customer_id = customer.connection_id.clone();
        }

        let Some(identity) = &self.identity else {
            return Ok(ResolvedCustomer::accepted(customer));
        };

        let customer_id_valid = is_customer_id_valid(customer.customer_id.as_deref());
        let id_valid = is_customer_id_valid(customer.id.as_deref());
        let connection_id_valid = is_connection_id_valid(customer.connection_id.as_deref());

        if !customer_id_valid && !id_valid && !connection_id_valid {
            warnings.push(StatusMessage::demand_warning(
                WARNING_INCORRECT_IDS,
                REASON_IDS_MANDATORY,
            ));
            return Ok(ResolvedCustomer::rejected(customer));
        }

        if !customer_id_valid {
            customer.customer_id = if id_valid { customer.id.clone() } else { None };
        }
        let connection_id = customer
            .connection_id
            .as_deref()
            .filter(|_| connection_id_valid);

        match identity
            .lookup(connection_id, customer.customer_id.as_deref())
            .await
        {
            Ok(Some(found)) => {
                let found = found.normalized();
                debug!(
                    customer_id = found.customer_id_or_empty(),
                    "customer consolidated by identity service"
                );
                customer.customer_id = found.customer_id;
                if customer.connection_id.is_none() {
                    customer.connection_id = found.connection_id;
                }
                Ok(ResolvedCustomer::accepted(customer))
            }
            Ok(None) => {
                warn!(
                    customer_id = customer.customer_id_or_empty(),
                    connection_id = customer.connection_id_or_empty(),
                    "customer not found by identity service"
                );
                warnings.push(StatusMessage::demand_warning(
                    WARNING_INCORRECT_IDS,
                    REASON_NOT_FOUND,
                ));
                Ok(ResolvedCustomer::rejected(customer))
            }
            Err(err) => {
                error!(error = %err, "identity lookup failed");
                warnings.push(StatusMessage::new(
                    MESSAGE_TYPE_DEMAND,
                    MESSAGE_STATUS_ERROR,
                    WARNING_INCORRECT_IDS,
                    REASON_LOOKUP_FAILED,
                ));
                Err(err)
            }
        }
    }
}
