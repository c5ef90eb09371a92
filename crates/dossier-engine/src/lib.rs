// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation engine for the dossier notification store.
//!
//! [`NotificationService`] is the entry point: it resolves the customer
//! and the canonical status of each inbound notification, upserts the
//! demand it belongs to, stores the notification contents, and records
//! audit events for anything it had to warn about. The temporary-status
//! registry, customer reassignment, and customer erasure are exposed
//! through the same service.

pub mod cache;
pub mod content;
pub mod customer;
pub mod erase;
pub mod events;
pub mod identity;
pub mod ingest;
pub mod merge;
pub mod registry;
pub mod service;
pub mod status;

pub use cache::Cache;
pub use content::{ContentOptions, ContentWriter, decode_blob};
pub use customer::{CustomerResolver, ResolvedCustomer};
pub use identity::HttpIdentityResolver;
pub use ingest::{DemandEngine, IngestOutcome};
pub use merge::ReassignRequest;
pub use registry::StatusRegistry;
pub use service::{IngestReport, NotificationService, NotificationServiceBuilder, ServiceOptions};
pub use status::{StatusResolution, resolve_status};
