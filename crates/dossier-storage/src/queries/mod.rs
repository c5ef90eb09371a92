// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules. Every function takes a `&Database` and runs through the
//! single writer thread.

pub mod blobs;
pub mod contents;
pub mod customers;
pub mod demand_types;
pub mod demands;
pub mod events;
pub mod notifications;
pub mod statuses;
