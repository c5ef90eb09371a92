// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion warnings and the acknowledgement returned to producers.

use serde::{Deserialize, Serialize};

pub const MESSAGE_TYPE_DEMAND: &str = "DEMAND";
pub const MESSAGE_TYPE_NOTIFICATION: &str = "NOTIFICATION";
pub const MESSAGE_STATUS_WARNING: &str = "WARNING";
pub const MESSAGE_STATUS_ERROR: &str = "ERROR";

/// One warning or error produced while ingesting a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub status: String,
    pub message: String,
    pub reason: String,
}

impl StatusMessage {
    pub fn new(
        message_type: impl Into<String>,
        status: impl Into<String>,
        message: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            status: status.into(),
            message: message.into(),
            reason: reason.into(),
        }
    }

    /// A `DEMAND`/`WARNING` message.
    pub fn demand_warning(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(MESSAGE_TYPE_DEMAND, MESSAGE_STATUS_WARNING, message, reason)
    }

    /// A `NOTIFICATION`/`ERROR` message.
    pub fn notification_error(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(MESSAGE_TYPE_NOTIFICATION, MESSAGE_STATUS_ERROR, message, reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Received,
    Warning,
    Error,
}

/// Body of the `acknowledge` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledge {
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<StatusMessage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<StatusMessage>,
}

impl Acknowledge {
    /// `received` when there are no warnings, `warning` otherwise.
    pub fn from_warnings(warnings: Vec<StatusMessage>) -> Self {
        let status = if warnings.is_empty() {
            AckStatus::Received
        } else {
            AckStatus::Warning
        };
        Self {
            status,
            warnings,
            errors: Vec::new(),
        }
    }

    pub fn error(errors: Vec<StatusMessage>) -> Self {
        Self {
            status: AckStatus::Error,
            warnings: Vec::new(),
            errors,
        }
    }

    /// Wrap in the `{"acknowledge": {...}}` envelope.
    pub fn wrapped(self) -> AcknowledgeResponse {
        AcknowledgeResponse { acknowledge: self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgeResponse {
    pub acknowledge: Acknowledge,
}
