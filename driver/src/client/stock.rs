use std::time::Duration;

use error_stack::{Report, ResultExt};
use kernel::interface::client::{StockClient, TransportError};
use kernel::prelude::entity::{Stock, StockId, StockQuantity, StockUpdate};
use kernel::KernelError;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::{env, env_or};

const STOCK_SERVICE_URL: &str = "STOCK_SERVICE_URL";
const STOCK_SERVICE_TIMEOUT_MS: &str = "STOCK_SERVICE_TIMEOUT_MS";

#[derive(Debug, Clone)]
pub struct StockServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl StockServiceConfig {
    pub fn from_env() -> error_stack::Result<Self, KernelError> {
        let base_url = env(STOCK_SERVICE_URL)?;
        let timeout = env_or(STOCK_SERVICE_TIMEOUT_MS, 2000u64)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(timeout),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockBody {
    id: i64,
    current_quantity: u32,
}

impl From<StockBody> for Stock {
    fn from(value: StockBody) -> Self {
        Stock::new(
            StockId::new(value.id),
            StockQuantity::new(value.current_quantity),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateStockBody {
    current_quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateStockBody {
    quantity: i32,
}

/// Stock service over HTTP. Every request carries the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpStockClient {
    client: Client,
    base_url: String,
}

impl HttpStockClient {
    pub fn new(config: StockServiceConfig) -> error_stack::Result<Self, KernelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| "Failed to build stock service client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn stocks(&self) -> String {
        format!("{}/stocks", self.base_url)
    }

    async fn read(response: Response) -> error_stack::Result<Stock, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Report::new(TransportError::Status(status.as_u16()))
                .attach_printable(format!("{} {}", response.url(), status)));
        }
        let body = response.json::<StockBody>().await.convert_error()?;
        Ok(Stock::from(body))
    }
}

#[async_trait::async_trait]
impl StockClient for HttpStockClient {
    #[tracing::instrument(skip(self), fields(stock_id = id.as_ref()))]
    async fn fetch(&self, id: &StockId) -> error_stack::Result<Stock, TransportError> {
        let response = self
            .client
            .get(format!("{}/{}", self.stocks(), id.as_ref()))
            .send()
            .await
            .convert_error()?;
        Self::read(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn create(
        &self,
        initial_quantity: &StockQuantity,
    ) -> error_stack::Result<Stock, TransportError> {
        let body = CreateStockBody {
            current_quantity: *initial_quantity.as_ref(),
        };
        let response = self
            .client
            .post(self.stocks())
            .json(&body)
            .send()
            .await
            .convert_error()?;
        Self::read(response).await
    }

    #[tracing::instrument(skip(self), fields(stock_id = id.as_ref()))]
    async fn apply_update(
        &self,
        id: &StockId,
        update: &StockUpdate,
    ) -> error_stack::Result<Stock, TransportError> {
        let body = UpdateStockBody {
            quantity: *update.quantity(),
        };
        let response = self
            .client
            .put(format!("{}/{}", self.stocks(), id.as_ref()))
            .json(&body)
            .send()
            .await
            .convert_error()?;
        Self::read(response).await
    }
}
