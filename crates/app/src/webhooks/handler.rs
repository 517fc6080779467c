//! Webhook handler.

use std::sync::Arc;

use jiff::Timestamp;
use tracing::{debug, info, instrument, warn};

use crate::{
    catalog::{CatalogClient, CatalogError},
    markups::MarkupsService,
    prices::{PriceRequest, PricesService},
    webhooks::{
        errors::WebhookError,
        models::{WebhookEvent, WebhookKind, WebhookOutcome, WebhookPayload},
    },
};

/// Dispatches checked webhook events to the services they affect.
#[derive(Clone)]
pub struct WebhookHandler {
    catalog: Arc<dyn CatalogClient>,
    markups: Arc<dyn MarkupsService>,
    prices: Arc<dyn PricesService>,
}

impl WebhookHandler {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        markups: Arc<dyn MarkupsService>,
        prices: Arc<dyn PricesService>,
    ) -> Self {
        Self {
            catalog,
            markups,
            prices,
        }
    }

    /// Check a payload delivered as `kind` and act on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is invalid or the catalog cannot be read. Individual
    /// price failures are logged and counted in the outcome.
    #[instrument(skip(self, payload), fields(event_type = %payload.event_type))]
    pub async fn handle(
        &self,
        kind: WebhookKind,
        payload: &WebhookPayload,
        now: Timestamp,
    ) -> Result<WebhookOutcome, WebhookError> {
        match WebhookEvent::from_payload(kind, payload)? {
            WebhookEvent::ProductUpdated { product_id } => {
                self.recalculate_product_prices(product_id, now).await
            }
            WebhookEvent::ChannelCreated { channel_id } => {
                self.markups.invalidate_channel(&channel_id).await;

                info!(%channel_id, "markup cache invalidated for new channel");

                Ok(WebhookOutcome::CacheInvalidated { channel_id })
            }
        }
    }

    async fn recalculate_product_prices(
        &self,
        product_id: String,
        now: Timestamp,
    ) -> Result<WebhookOutcome, WebhookError> {
        let listings = match self.catalog.product_listings(&product_id).await {
            Ok(listings) => listings,
            Err(CatalogError::NotFound(_)) => {
                debug!(%product_id, "updated product no longer exists");

                Vec::new()
            }
            Err(error) => return Err(error.into()),
        };

        let requests = listings
            .into_iter()
            .map(|listing| PriceRequest {
                product_id: product_id.clone(),
                channel_id: listing.channel_id,
                base_price: listing.price,
            })
            .collect();

        let mut prices = Vec::new();
        let mut failed = 0;

        for result in self.prices.batch_calculate(requests, now).await {
            match result {
                Ok(price) => prices.push(price),
                Err(error) => {
                    failed += 1;

                    warn!(%product_id, %error, "failed to recalculate price");
                }
            }
        }

        info!(%product_id, recalculated = prices.len(), failed, "product prices recalculated");

        Ok(WebhookOutcome::PricesRecalculated {
            product_id,
            prices,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use tariff::{
        markups::MarkupPercent,
        pricing::{PriceQuery, evaluate_price},
    };
    use testresult::TestResult;

    use crate::{
        catalog::{MockCatalogClient, models::ChannelListing},
        markups::{MarkupsServiceError, MockMarkupsService},
        prices::{MockPricesService, PricesServiceError},
    };

    use super::*;

    fn payload(value: serde_json::Value) -> Result<WebhookPayload, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn listing(channel_id: &str, price: i64) -> ChannelListing {
        ChannelListing {
            channel_id: channel_id.to_string(),
            channel_slug: channel_id.to_lowercase(),
            price: Decimal::new(price, 0),
            currency: "USD".to_string(),
        }
    }

    fn handler(
        catalog: MockCatalogClient,
        markups: MockMarkupsService,
        prices: MockPricesService,
    ) -> WebhookHandler {
        WebhookHandler::new(Arc::new(catalog), Arc::new(markups), Arc::new(prices))
    }

    #[tokio::test]
    async fn channel_created_invalidates_markup() -> TestResult {
        let catalog = MockCatalogClient::new();
        let mut markups = MockMarkupsService::new();
        let mut prices = MockPricesService::new();

        markups
            .expect_invalidate_channel()
            .once()
            .withf(|id| id == "Q2hhbm5lbDo0")
            .return_once(|_| ());
        prices.expect_batch_calculate().never();

        let outcome = handler(catalog, markups, prices)
            .handle(
                WebhookKind::ChannelCreated,
                &payload(json!({"event_type": "CHANNEL_CREATED", "channel_id": "Q2hhbm5lbDo0"}))?,
                Timestamp::now(),
            )
            .await?;

        assert_eq!(
            outcome,
            WebhookOutcome::CacheInvalidated {
                channel_id: "Q2hhbm5lbDo0".to_string()
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn product_updated_recalculates_every_listing() -> TestResult {
        let mut catalog = MockCatalogClient::new();
        let mut markups = MockMarkupsService::new();
        let mut prices = MockPricesService::new();
        let now: Timestamp = "2025-06-15T12:00:00Z".parse()?;

        catalog
            .expect_product_listings()
            .once()
            .withf(|id| id == "UHJvZHVjdDox")
            .return_once(|_| Ok(vec![listing("Q2hhbm5lbDox", 100), listing("Q2hhbm5lbDoy", 100)]));
        markups.expect_invalidate_channel().never();
        prices
            .expect_batch_calculate()
            .once()
            .withf(move |requests, at| {
                *at == now
                    && requests
                        .iter()
                        .map(|request| request.channel_id.as_str())
                        .eq(["Q2hhbm5lbDox", "Q2hhbm5lbDoy"])
            })
            .return_once(|requests, at| {
                requests
                    .into_iter()
                    .map(|request| {
                        if request.channel_id == "Q2hhbm5lbDoy" {
                            return Err(PricesServiceError::Markups(MarkupsServiceError::Catalog(
                                CatalogError::Api("timeout".to_string()),
                            )));
                        }

                        let query = PriceQuery::new(
                            request.product_id,
                            request.channel_id,
                            request.base_price,
                            MarkupPercent::ZERO,
                        );

                        Ok(evaluate_price(&query, &[], at)?)
                    })
                    .collect()
            });

        let outcome = handler(catalog, markups, prices)
            .handle(
                WebhookKind::ProductUpdated,
                &payload(json!({"event_type": "PRODUCT_UPDATED", "product_id": "UHJvZHVjdDox"}))?,
                now,
            )
            .await?;

        let WebhookOutcome::PricesRecalculated {
            product_id,
            prices,
            failed,
        } = outcome
        else {
            return Err("expected recalculation".into());
        };

        assert_eq!(product_id, "UHJvZHVjdDox");
        assert_eq!(prices.len(), 1);
        assert_eq!(
            prices.first().map(|price| price.final_price),
            Some(Decimal::new(10_000, 2))
        );
        assert_eq!(failed, 1);

        Ok(())
    }

    #[tokio::test]
    async fn mismatched_payload_is_rejected_before_any_work() -> TestResult {
        let mut catalog = MockCatalogClient::new();
        let mut markups = MockMarkupsService::new();
        let mut prices = MockPricesService::new();

        catalog.expect_product_listings().never();
        markups.expect_invalidate_channel().never();
        prices.expect_batch_calculate().never();

        let handler = handler(catalog, markups, prices);

        let wrong_type = handler
            .handle(
                WebhookKind::ProductUpdated,
                &payload(json!({"event_type": "CHANNEL_CREATED", "product_id": "UHJvZHVjdDox"}))?,
                Timestamp::now(),
            )
            .await;
        let missing_id = handler
            .handle(
                WebhookKind::ChannelCreated,
                &payload(json!({"event_type": "CHANNEL_CREATED"}))?,
                Timestamp::now(),
            )
            .await;

        assert!(matches!(wrong_type, Err(WebhookError::InvalidPayload(_))));
        assert!(matches!(missing_id, Err(WebhookError::InvalidPayload(_))));

        Ok(())
    }

    #[tokio::test]
    async fn vanished_product_recalculates_nothing() -> TestResult {
        let mut catalog = MockCatalogClient::new();
        let markups = MockMarkupsService::new();
        let mut prices = MockPricesService::new();

        catalog
            .expect_product_listings()
            .once()
            .return_once(|id| Err(CatalogError::NotFound(id.to_string())));
        prices
            .expect_batch_calculate()
            .once()
            .withf(|requests, _| requests.is_empty())
            .return_once(|_, _| Vec::new());

        let outcome = handler(catalog, markups, prices)
            .handle(
                WebhookKind::ProductUpdated,
                &payload(json!({"event_type": "PRODUCT_UPDATED", "product_id": "gone"}))?,
                Timestamp::now(),
            )
            .await?;

        assert_eq!(
            outcome,
            WebhookOutcome::PricesRecalculated {
                product_id: "gone".to_string(),
                prices: Vec::new(),
                failed: 0,
            }
        );

        Ok(())
    }
}
