// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// A known kind of demand, referenced by `DemandPayload::type_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandType {
    #[serde(default)]
    pub id: Option<i64>,
    pub type_id: String,
    pub label: String,
    #[serde(default)]
    pub category_code: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub app_code: Option<String>,
}
