// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST gateway for the dossier notification store.
//!
//! Exposes the [`NotificationService`](dossier_engine::NotificationService)
//! under `/api/v3`. Every route except `/health` requires a bearer token.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::ApiError;
pub use server::{API_PREFIX, GatewayState, ServerConfig, router, start_server};
