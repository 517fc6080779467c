//! App Context

use std::{fs, io, path::Path, sync::Arc};

use rusty_money::iso::Currency;
use tariff::{
    fixtures::{CatalogFixture, FixtureError},
    pricing::{PricingError, find_currency},
};
use thiserror::Error;
use tracing::info;

use crate::{
    catalog::{CatalogClient, GraphQlCatalog, GraphQlConfig, MemoryCatalog},
    config::CatalogConfig,
    discounts::{CatalogDiscountsService, DiscountsService},
    markups::{CatalogMarkupsService, MarkupCache, MarkupsService},
    prices::{ComposedPricesService, PricesService},
    webhooks::WebhookHandler,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to read demo catalog {path}")]
    ReadFixtures {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to load demo catalog")]
    Fixtures(#[from] FixtureError),

    #[error("invalid price currency")]
    Currency(#[from] PricingError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogClient>,
    pub markups: Arc<dyn MarkupsService>,
    pub discounts: Arc<dyn DiscountsService>,
    pub prices: Arc<dyn PricesService>,
    pub webhooks: WebhookHandler,
}

impl AppContext {
    /// Build application context from catalog settings.
    ///
    /// Without a usable app token the in-memory demo catalog is used.
    ///
    /// # Errors
    ///
    /// Returns an error when the currency is unknown or demo fixtures fail to load.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, AppInitError> {
        let currency = find_currency(&config.price_currency)?;

        let catalog: Arc<dyn CatalogClient> = if config.demo_mode() {
            let fixture = match &config.demo_fixtures_path {
                Some(path) => load_fixture(path)?,
                None => CatalogFixture::demo()?,
            };

            info!(
                channels = fixture.channels.len(),
                products = fixture.products.len(),
                "no catalog token configured, using demo catalog"
            );

            Arc::new(MemoryCatalog::from_fixture(&fixture)?)
        } else {
            Arc::new(GraphQlCatalog::new(GraphQlConfig {
                api_url: config.api_url.clone(),
                token: config.app_token.clone(),
            }))
        };

        Ok(Self::with_catalog(
            catalog,
            MarkupCache::new(config.markup_cache_ttl()),
            currency,
        ))
    }

    /// Wire the services over an existing catalog client.
    #[must_use]
    pub fn with_catalog(
        catalog: Arc<dyn CatalogClient>,
        cache: MarkupCache,
        currency: &'static Currency,
    ) -> Self {
        let markups: Arc<dyn MarkupsService> =
            Arc::new(CatalogMarkupsService::new(catalog.clone(), cache));
        let discounts: Arc<dyn DiscountsService> =
            Arc::new(CatalogDiscountsService::new(catalog.clone()));
        let prices: Arc<dyn PricesService> = Arc::new(ComposedPricesService::new(
            markups.clone(),
            discounts.clone(),
            currency,
        ));
        let webhooks = WebhookHandler::new(catalog.clone(), markups.clone(), prices.clone());

        Self {
            catalog,
            markups,
            discounts,
            prices,
            webhooks,
        }
    }
}

fn load_fixture(path: &Path) -> Result<CatalogFixture, AppInitError> {
    let contents = fs::read_to_string(path).map_err(|source| AppInitError::ReadFixtures {
        path: path.display().to_string(),
        source,
    })?;

    Ok(CatalogFixture::from_yaml(&contents)?)
}
