// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forwarder and listener doubles that capture every call.

use async_trait::async_trait;
use tokio::sync::Mutex;

use dossier_core::model::{Demand, Notification};
use dossier_core::{DemandListener, DossierError, NotificationForwarder};

/// Captures forwarded notifications. Optionally fails every call after
/// capturing it.
#[derive(Default)]
pub struct RecordingForwarder {
    forwarded: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            forwarded: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn forwarded(&self) -> Vec<Notification> {
        self.forwarded.lock().await.clone()
    }
}

#[async_trait]
impl NotificationForwarder for RecordingForwarder {
    fn name(&self) -> &str {
        "recording-forwarder"
    }

    async fn forward(&self, notification: &Notification) -> Result<(), DossierError> {
        self.forwarded.lock().await.push(notification.clone());
        if self.fail {
            return Err(DossierError::Internal("forwarder down".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListenerCall {
    DemandCreated(String),
    DemandUpdated(String),
    NotificationCreated(String),
}

#[derive(Default)]
pub struct RecordingListener {
    calls: Mutex<Vec<ListenerCall>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<ListenerCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl DemandListener for RecordingListener {
    fn name(&self) -> &str {
        "recording-listener"
    }

    async fn on_demand_created(&self, demand: &Demand) -> Result<(), DossierError> {
        self.calls
            .lock()
            .await
            .push(ListenerCall::DemandCreated(demand.id.clone()));
        Ok(())
    }

    async fn on_demand_updated(&self, demand: &Demand) -> Result<(), DossierError> {
        self.calls
            .lock()
            .await
            .push(ListenerCall::DemandUpdated(demand.id.clone()));
        Ok(())
    }

    async fn on_notification_created(
        &self,
        notification: &Notification,
    ) -> Result<(), DossierError> {
        self.calls
            .lock()
            .await
            .push(ListenerCall::NotificationCreated(notification.demand.id.clone()));
        Ok(())
    }
}
