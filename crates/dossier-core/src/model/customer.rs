// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer identifiers carried by demands and notifications.

use serde::{Deserialize, Serialize};

/// Maximum accepted length for a connection id.
const MAX_CONNECTION_ID_LEN: usize = 255;

/// Raw or resolved customer identifiers.
///
/// `customer_id` is the identity-store key, `connection_id` the login-provider
/// key, and `id` a legacy alias for `customer_id` that some producers still send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
}

impl Customer {
    /// Build a customer from a customer id only.
    pub fn with_customer_id(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Self::default()
        }
    }

    /// Trim every identifier and drop the blank ones.
    pub fn normalized(self) -> Self {
        Self {
            id: normalize_id(self.id),
            customer_id: normalize_id(self.customer_id),
            connection_id: normalize_id(self.connection_id),
        }
    }

    /// The customer id, or `""` when none is set.
    pub fn customer_id_or_empty(&self) -> &str {
        self.customer_id.as_deref().unwrap_or_default()
    }

    /// The connection id, or `""` when none is set.
    pub fn connection_id_or_empty(&self) -> &str {
        self.connection_id.as_deref().unwrap_or_default()
    }
}

fn normalize_id(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A customer id is well-formed when it parses as a UUID.
pub fn is_customer_id_valid(customer_id: Option<&str>) -> bool {
    customer_id
        .map(str::trim)
        .is_some_and(|id| uuid::Uuid::parse_str(id).is_ok())
}

/// A connection id is well-formed when it is non-blank, bounded, and has no whitespace.
pub fn is_connection_id_valid(connection_id: Option<&str>) -> bool {
    connection_id.map(str::trim).is_some_and(|id| {
        !id.is_empty()
            && id.len() <= MAX_CONNECTION_ID_LEN
            && !id.chars().any(char::is_whitespace)
    })
}
