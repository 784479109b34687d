//! NATS connection settings for the chunk store

use async_nats::{Client, ConnectOptions};
use std::time::Duration;
use tracing::info;

use crate::errors::{TenancyError, TenancyResult};

/// Where and how the operator reaches NATS
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// Server URLs, joined with `,` when connecting
    pub servers: Vec<String>,
    /// Client name shown in server monitoring
    pub name: String,
    pub connect_timeout: Duration,
    /// Applies to JetStream KV requests as well
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "cim-tenancy".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Open a client for the chunk store
pub async fn connect(config: &NatsConfig) -> TenancyResult<Client> {
    let servers = config.servers.join(",");
    let options = ConnectOptions::new()
        .name(&config.name)
        .connection_timeout(config.connect_timeout)
        .request_timeout(Some(config.request_timeout));

    let client = async_nats::connect_with_options(servers.as_str(), options)
        .await
        .map_err(|e| TenancyError::NatsConnection(format!("{servers}: {e}")))?;

    info!(%servers, client = %config.name, "Connected to NATS");
    Ok(client)
}
