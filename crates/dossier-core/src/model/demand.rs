// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The demand aggregate and its identifying triple.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::customer::Customer;
use super::notification::NotificationType;
use super::status::{GenericStatus, UNDEFINED_STATUS_ID};

/// Identifies a demand: at most one live demand exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandKey {
    pub demand_id: String,
    pub demand_type_id: String,
    pub customer_id: String,
}

impl DemandKey {
    pub fn new(
        demand_id: impl Into<String>,
        demand_type_id: impl Into<String>,
        customer_id: impl Into<String>,
    ) -> Self {
        Self {
            demand_id: demand_id.into(),
            demand_type_id: demand_type_id.into(),
            customer_id: customer_id.into(),
        }
    }
}

/// A citizen's administrative request, as consolidated from its notifications.
///
/// Dates are epoch seconds. `closure_date == 0` means the demand is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    /// Surrogate key assigned by the store.
    #[serde(default)]
    pub uid: Option<i64>,
    pub id: String,
    pub type_id: String,
    #[serde(default)]
    pub subtype_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    pub creation_date: i64,
    pub modify_date: i64,
    pub closure_date: i64,
    pub max_steps: i32,
    pub current_step: i32,
    pub status_id: i32,
    pub customer: Customer,
    #[serde(default)]
    pub metadata: Option<String>,
}

impl Demand {
    /// The identifying triple of this demand.
    pub fn key(&self) -> DemandKey {
        DemandKey::new(
            self.id.clone(),
            self.type_id.clone(),
            self.customer.customer_id_or_empty(),
        )
    }

    /// The canonical status, or `None` when undefined.
    pub fn generic_status(&self) -> Option<GenericStatus> {
        GenericStatus::from_id(self.status_id)
    }

    pub fn is_closed(&self) -> bool {
        self.closure_date != 0
    }

    pub fn has_undefined_status(&self) -> bool {
        self.status_id == UNDEFINED_STATUS_ID
    }
}

/// Order of demand listings by modification date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
pub enum SortDirection {
    #[strum(serialize = "ASC")]
    Asc,
    #[default]
    #[strum(serialize = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filter for listing a customer's demands.
///
/// Empty `demand_type_ids` or `status_ids` match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemandQuery {
    pub customer_id: String,
    pub demand_type_ids: Vec<String>,
    pub status_ids: Vec<i32>,
    /// Keep only demands with at least one content of this kind.
    pub notification_type: Option<NotificationType>,
    pub direction: SortDirection,
}

impl DemandQuery {
    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Self::default()
        }
    }
}
