// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for dossier integration tests.
//!
//! Provides mock collaborators and a harness that wires a real
//! [`NotificationService`](dossier_engine::NotificationService) onto a
//! temporary SQLite database, without external services.
//!
//! # Components
//!
//! - [`TestHarness`] - service + store + blob store on a temp database
//! - [`MockIdentityResolver`] - scripted identity service
//! - [`RecordingForwarder`] / [`RecordingListener`] - capture fan-out calls
//! - [`fixtures`] - notification builders

pub mod fixtures;
pub mod harness;
pub mod mock_identity;
pub mod recording;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_identity::MockIdentityResolver;
pub use recording::{ListenerCall, RecordingForwarder, RecordingListener};
