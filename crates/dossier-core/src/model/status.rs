// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical (generic) statuses and the temporary-status registry entry.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Status id meaning "no canonical status could be resolved".
pub const UNDEFINED_STATUS_ID: i32 = -1;

/// Temporary status id stamped on content whose status was resolved.
pub const NO_TEMPORARY_STATUS_ID: i64 = -1;

/// The fixed canonical status enumeration.
///
/// The discriminant is the persisted status id. `-1` ("undefined") is not a
/// member and is represented by [`UNDEFINED_STATUS_ID`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenericStatus {
    Initiated = 1,
    Ongoing = 2,
    ToComplete = 3,
    Suspended = 4,
    Accepted = 5,
    Refused = 6,
    Canceled = 7,
    Closed = 8,
}

impl GenericStatus {
    /// Look up a canonical status by its persisted id.
    pub fn from_id(id: i32) -> Option<Self> {
        Self::iter().find(|status| status.id() == id)
    }

    /// The persisted id of this status.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Whether a demand in this status is closed.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::Accepted | Self::Refused | Self::Canceled | Self::Closed
        )
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Initiated => "Initiated",
            Self::Ongoing => "Ongoing",
            Self::ToComplete => "To complete",
            Self::Suspended => "Suspended",
            Self::Accepted => "Accepted",
            Self::Refused => "Refused",
            Self::Canceled => "Canceled",
            Self::Closed => "Closed",
        }
    }
}

/// A provider-specific status label pending (or having received) an operator
/// mapping to a canonical status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryStatus {
    pub id: i64,
    pub label: String,
    #[serde(default)]
    pub generic_status: Option<GenericStatus>,
}

/// Normalize a status label for registry matching.
///
/// Keeps alphanumeric characters only and lowercases them, so " En-Cours "
/// and "encours" normalize to the same string.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns `true` when the stored label is contained in the incoming one
/// after normalization. An empty stored label never matches.
pub fn label_matches(stored: &str, incoming: &str) -> bool {
    let stored = normalize_label(stored);
    !stored.is_empty() && normalize_label(incoming).contains(&stored)
}
