// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits (ports) implemented by external collaborators.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod adapter;
pub mod content;
pub mod forwarder;
pub mod identity;
pub mod listener;
pub mod store;

pub use adapter::PluginAdapter;
pub use content::{ContentBlob, ContentBlobStore};
pub use forwarder::NotificationForwarder;
pub use identity::IdentityResolver;
pub use listener::DemandListener;
pub use store::{
    BackfillReport, CustomerStore, DemandStore, DemandTypeStore, ErasureReport, EventStore,
    NotificationContentStore, NotificationStore, ReassignReport, Store, TemporaryStatusStore,
};
