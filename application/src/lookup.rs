use kernel::interface::client::StockClient;
use kernel::prelude::entity::{Stock, StockId};

use crate::resilience::{CircuitBreaker, ResilienceConfig, ResiliencePolicy};

pub const STOCK_BREAKER_NAME: &str = "stock-service";

/// Reads stock records without ever failing: `None` means no data available.
#[async_trait::async_trait]
pub trait StockLookup: 'static + Sync + Send {
    async fn fetch(&self, id: &StockId) -> Option<Stock>;
}

pub trait DependOnStockLookup: 'static + Sync + Send {
    type StockLookup: StockLookup;
    fn stock_lookup(&self) -> &Self::StockLookup;
}

/// [`StockClient::fetch`] behind a [`ResiliencePolicy`] whose fallback answers
/// `None`, whether retries ran out or the breaker refused the call.
pub struct ResilientStockLookup<C> {
    client: C,
    policy: ResiliencePolicy,
}

impl<C: StockClient> ResilientStockLookup<C> {
    pub fn new(client: C, policy: ResiliencePolicy) -> Self {
        Self { client, policy }
    }

    pub fn from_config(client: C, config: ResilienceConfig) -> Self {
        Self::new(
            client,
            ResiliencePolicy::from_config(STOCK_BREAKER_NAME, config),
        )
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        self.policy.breaker()
    }
}

#[async_trait::async_trait]
impl<C: StockClient> StockLookup for ResilientStockLookup<C> {
    #[tracing::instrument(skip(self), fields(stock_id = id.as_ref()))]
    async fn fetch(&self, id: &StockId) -> Option<Stock> {
        let client = &self.client;
        self.policy
            .execute(
                move || async move { client.fetch(id).await.map(Some) },
                |cause| {
                    tracing::warn!(%cause, "stock unavailable, continuing without it");
                    None
                },
            )
            .await
    }
}
