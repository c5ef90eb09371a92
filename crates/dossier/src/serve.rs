// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dossier serve` command implementation.
//!
//! Opens storage, wires the notification service with its collaborators,
//! and runs the REST gateway until a shutdown signal arrives.

use std::sync::Arc;

use dossier_config::DossierConfig;
use dossier_core::DossierError;
use dossier_engine::{ContentOptions, HttpIdentityResolver, NotificationService, ServiceOptions};
use dossier_gateway::{GatewayState, ServerConfig, start_server};
use dossier_storage::{SqliteBlobStore, SqliteStore};
use tracing::{info, warn};

pub async fn run_serve(config: DossierConfig) -> Result<(), DossierError> {
    init_tracing(&config.server.log_level);

    let store = SqliteStore::open(&config.storage).await?;
    let blobs = SqliteBlobStore::new(store.database().clone());
    info!(path = %config.storage.database_path, "storage ready");

    let mut builder = NotificationService::builder(Arc::new(store.clone()), Arc::new(blobs))
        .options(service_options(&config));
    if config.identity.enabled {
        let identity = HttpIdentityResolver::new(&config.identity)?;
        info!(
            endpoint = config.identity.endpoint.as_deref().unwrap_or_default(),
            "identity service enabled"
        );
        builder = builder.identity(Arc::new(identity));
    }
    let service = Arc::new(builder.build());

    let server_config = server_config(&config);
    if server_config.bearer_token.is_none() {
        warn!("server.bearer_token is not set -- every API request will be rejected");
    }

    start_server(&server_config, GatewayState { service }, shutdown_signal()).await?;

    info!("shutting down");
    store.database().clone().close().await?;
    Ok(())
}

fn service_options(config: &DossierConfig) -> ServiceOptions {
    ServiceOptions {
        content: ContentOptions {
            compress: config.content.compress,
            file_store: config.content.file_store.clone(),
        },
        connection_id_as_customer_id: config.customer.connection_id_as_customer_id,
    }
}

fn server_config(config: &DossierConfig) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        bearer_token: config.server.bearer_token.clone(),
        request_body_limit: config.server.request_body_limit,
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c"),
        () = terminate => info!("received SIGTERM"),
    }
}

/// Initialize the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dossier={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let toml = r#"
            [server]
            bearer_token = "t"
            port = 9000

            [content]
            compress = true
            file_store = "archive"

            [customer]
            connection_id_as_customer_id = true
        "#;
        let config = dossier_config::load_and_validate_str(toml).expect("valid config");

        let options = service_options(&config);
        assert!(options.content.compress);
        assert_eq!(options.content.file_store, "archive");
        assert!(options.connection_id_as_customer_id);

        let server = server_config(&config);
        assert_eq!(server.port, 9000);
        assert_eq!(server.bearer_token.as_deref(), Some("t"));
    }
}
