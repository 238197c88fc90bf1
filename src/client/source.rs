//! Where the pollers read orders from.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use domain::Order;

use super::{ClientConfig, ClientError, ClientResult};
use crate::config::USER_ID_HEADER;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to orders, as the pollers need it.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Most recent orders, newest first (admin only on the server)
    async fn recent_orders(&self, limit: u64) -> ClientResult<Vec<Order>>;

    /// A single order
    async fn order(&self, id: Uuid) -> ClientResult<Order>;
}

/// `OrderSource` over the HTTP API
#[derive(Debug, Clone)]
pub struct HttpOrderSource {
    client: Client,
    config: ClientConfig,
}

impl HttpOrderSource {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self { client, config })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .client
            .get(self.config.url(path))
            .header(USER_ID_HEADER, &self.config.user_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(ClientError::from_response(status, &text));
        }

        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn recent_orders(&self, limit: u64) -> ClientResult<Vec<Order>> {
        self.get(&format!("orders?limit={}", limit)).await
    }

    async fn order(&self, id: Uuid) -> ClientResult<Order> {
        self.get(&format!("orders/{}", id)).await
    }
}
