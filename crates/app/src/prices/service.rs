//! Prices service.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{join_all, try_join};
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;
use tariff::pricing::{PriceCalculation, PriceQuery, evaluate_price};
use tracing::instrument;

use crate::{
    discounts::DiscountsService, markups::MarkupsService, prices::errors::PricesServiceError,
};

/// Price calculation request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceRequest {
    pub product_id: String,
    pub channel_id: String,
    #[serde(deserialize_with = "tariff::numbers::deserialize_decimal")]
    pub base_price: Decimal,
}

/// Prices composed from the markups and discounts services.
pub struct ComposedPricesService {
    markups: Arc<dyn MarkupsService>,
    discounts: Arc<dyn DiscountsService>,
    currency: &'static Currency,
}

impl ComposedPricesService {
    #[must_use]
    pub fn new(
        markups: Arc<dyn MarkupsService>,
        discounts: Arc<dyn DiscountsService>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            markups,
            discounts,
            currency,
        }
    }
}

#[async_trait]
impl PricesService for ComposedPricesService {
    #[instrument(skip(self))]
    async fn calculate_price(
        &self,
        request: PriceRequest,
        now: Timestamp,
    ) -> Result<PriceCalculation, PricesServiceError> {
        let (markup, rules) = try_join(
            async {
                self.markups
                    .get_channel_markup(&request.channel_id)
                    .await
                    .map_err(PricesServiceError::from)
            },
            async {
                self.discounts
                    .get_discount_rules(&request.product_id)
                    .await
                    .map_err(PricesServiceError::from)
            },
        )
        .await?;

        let query = PriceQuery::new(
            request.product_id,
            request.channel_id,
            request.base_price,
            markup,
        )
        .with_currency(self.currency);

        Ok(evaluate_price(&query, &rules, now)?)
    }

    #[instrument(skip(self, requests), fields(count = requests.len()))]
    async fn batch_calculate(
        &self,
        requests: Vec<PriceRequest>,
        now: Timestamp,
    ) -> Vec<Result<PriceCalculation, PricesServiceError>> {
        join_all(
            requests
                .into_iter()
                .map(|request| self.calculate_price(request, now)),
        )
        .await
    }
}

#[automock]
#[async_trait]
pub trait PricesService: Send + Sync {
    /// Final price of a product in a channel at `now`.
    async fn calculate_price(
        &self,
        request: PriceRequest,
        now: Timestamp,
    ) -> Result<PriceCalculation, PricesServiceError>;

    /// Independent calculations, one result per request in request order.
    async fn batch_calculate(
        &self,
        requests: Vec<PriceRequest>,
        now: Timestamp,
    ) -> Vec<Result<PriceCalculation, PricesServiceError>>;
}
