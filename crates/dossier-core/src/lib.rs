// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the dossier notification store.
//!
//! This crate provides the domain model, the error type, and the capability
//! traits every other dossier crate builds on. Storage backends, the identity
//! client, and downstream forwarders implement the traits defined here.

pub mod error;
pub mod model;
pub mod traits;
pub mod types;

pub use error::DossierError;
pub use types::{AdapterType, HealthStatus};

pub use traits::{
    BackfillReport, ContentBlob, ContentBlobStore, CustomerStore, DemandListener, DemandStore,
    DemandTypeStore, ErasureReport, EventStore, IdentityResolver, NotificationContentStore,
    NotificationForwarder, NotificationStore, PluginAdapter, ReassignReport, Store,
    TemporaryStatusStore,
};
