// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external identity service.
//!
//! `GET {endpoint}/identities?connectionId=..&customerId=..` answers `200`
//! with the consolidated customer, or `404` when no identity matches.

use std::time::Duration;

use async_trait::async_trait;
use dossier_config::model::IdentityConfig;
use dossier_core::model::Customer;
use dossier_core::{AdapterType, DossierError, HealthStatus, IdentityResolver, PluginAdapter};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

const CLIENT_CODE_HEADER: &str = "client_code";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityResponse {
    customer_id: Option<String>,
    #[serde(default)]
    connection_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpIdentityResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityResolver {
    pub fn new(config: &IdentityConfig) -> Result<Self, DossierError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| DossierError::Config("identity.endpoint is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            CLIENT_CODE_HEADER,
            HeaderValue::from_str(&config.client_code).map_err(|e| {
                DossierError::Config(format!("invalid identity client code header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DossierError::Identity {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn lookup_url(
        &self,
        connection_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> Result<Url, DossierError> {
        let mut url = Url::parse(&format!("{}/identities", self.base_url)).map_err(|e| {
            DossierError::Config(format!("invalid identity endpoint `{}`: {e}", self.base_url))
        })?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(connection_id) = connection_id {
                query.append_pair("connectionId", connection_id);
            }
            if let Some(customer_id) = customer_id {
                query.append_pair("customerId", customer_id);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl PluginAdapter for HttpIdentityResolver {
    fn name(&self) -> &str {
        "http-identity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Identity
    }

    async fn health_check(&self) -> Result<HealthStatus, DossierError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn lookup(
        &self,
        connection_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> Result<Option<Customer>, DossierError> {
        let url = self.lookup_url(connection_id, customer_id)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DossierError::Identity {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "identity response received");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DossierError::Identity {
                message: format!("identity service returned {status}: {body}"),
                source: None,
            });
        }

        let body: IdentityResponse = response.json().await.map_err(|e| DossierError::Identity {
            message: format!("failed to parse identity response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let Some(customer_id) = body.customer_id.filter(|id| !id.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(Customer {
            id: None,
            customer_id: Some(customer_id),
            connection_id: body.connection_id,
        }))
    }
}
