// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of [`DossierError`] onto HTTP responses.
//!
//! Every error is rendered as an `error` acknowledgement so producers see
//! one shape whatever went wrong.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dossier_core::DossierError;
use dossier_core::model::{Acknowledge, StatusMessage};

#[derive(Debug)]
pub struct ApiError(pub DossierError);

impl From<DossierError> for ApiError {
    fn from(err: DossierError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            DossierError::MalformedInput(_) | DossierError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            DossierError::NotFound { .. } => StatusCode::NOT_FOUND,
            DossierError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match &self.0 {
            DossierError::Config(_) => "ConfigError",
            DossierError::Storage { .. } => "StorageError",
            DossierError::MalformedInput(_) => "MalformedInput",
            DossierError::Validation(_) => "ValidationError",
            DossierError::Identity { .. } => "IdentityServiceError",
            DossierError::ContentStore { .. } => "ContentStoreError",
            DossierError::NotFound { .. } => "NotFound",
            DossierError::Conflict(_) => "Conflict",
            DossierError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }
        let message = StatusMessage::notification_error(self.kind(), self.0.to_string());
        (status, Json(Acknowledge::error(vec![message]).wrapped())).into_response()
    }
}
