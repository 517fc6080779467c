//! In-memory catalog used in demo mode and tests.

use async_trait::async_trait;
use tariff::{
    discounts::{DISCOUNTS_METADATA_KEY, format_rules},
    fixtures::{CatalogFixture, FixtureError},
    markups::MARKUP_METADATA_KEY,
};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::catalog::{
    CatalogClient, CatalogError,
    models::{
        Channel, ChannelListing, MetadataItem, Product, SUBDOMAIN_METADATA_KEY, merge_metadata,
    },
};

#[derive(Debug, Default)]
struct MemoryState {
    channels: Vec<Channel>,
    products: Vec<(Product, Vec<ChannelListing>)>,
}

/// Catalog held in memory, seeded from fixture data.
///
/// Metadata updates are kept for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: RwLock<MemoryState>,
}

impl MemoryCatalog {
    /// Seed a catalog from fixture data.
    ///
    /// Channel markups and subdomains, and product discount rules, become metadata items the
    /// same way they are stored in a live catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a listing price cannot be parsed or discount rules cannot be encoded.
    pub fn from_fixture(fixture: &CatalogFixture) -> Result<Self, FixtureError> {
        let channels: Vec<Channel> = fixture
            .channels
            .iter()
            .map(|channel| {
                let mut metadata = Vec::new();

                if let Some(markup) = channel.markup {
                    metadata.push(MetadataItem::new(MARKUP_METADATA_KEY, markup.to_string()));
                }

                if let Some(subdomain) = &channel.subdomain {
                    metadata.push(MetadataItem::new(SUBDOMAIN_METADATA_KEY, subdomain));
                }

                Channel {
                    id: channel.id.clone(),
                    name: channel.name.clone(),
                    slug: channel.slug.clone(),
                    metadata,
                }
            })
            .collect();

        let mut products = Vec::with_capacity(fixture.products.len());

        for product in &fixture.products {
            let mut metadata = Vec::new();

            if !product.discounts.is_empty() {
                metadata.push(MetadataItem::new(
                    DISCOUNTS_METADATA_KEY,
                    format_rules(&product.discounts)?,
                ));
            }

            let mut listings = Vec::with_capacity(product.listings.len());

            for listing in &product.listings {
                let (price, currency) = listing.parse_price()?;

                let channel_slug = channels
                    .iter()
                    .find(|channel| channel.id == listing.channel)
                    .map(|channel| channel.slug.clone())
                    .ok_or_else(|| FixtureError::ChannelNotFound(listing.channel.clone()))?;

                listings.push(ChannelListing {
                    channel_id: listing.channel.clone(),
                    channel_slug,
                    price,
                    currency: currency.iso_alpha_code.to_string(),
                });
            }

            products.push((
                Product {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    slug: product.slug.clone(),
                    metadata,
                },
                listings,
            ));
        }

        Ok(Self {
            state: RwLock::new(MemoryState { channels, products }),
        })
    }

    /// The bundled demo catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled fixtures fail to load.
    pub fn demo() -> Result<Self, FixtureError> {
        Self::from_fixture(&CatalogFixture::demo()?)
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn channel(&self, id: &str) -> Result<Option<Channel>, CatalogError> {
        let state = self.state.read().await;

        Ok(state.channels.iter().find(|channel| channel.id == id).cloned())
    }

    async fn list_channels(&self) -> Result<Vec<Channel>, CatalogError> {
        Ok(self.state.read().await.channels.clone())
    }

    async fn product(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        let state = self.state.read().await;

        Ok(state
            .products
            .iter()
            .find(|(product, _)| product.id == id)
            .map(|(product, _)| product.clone()))
    }

    async fn list_products(
        &self,
        channel_slug: Option<String>,
        first: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        let state = self.state.read().await;

        let products = state
            .products
            .iter()
            .filter(|(_, listings)| {
                channel_slug.as_ref().is_none_or(|slug| {
                    listings.iter().any(|listing| listing.channel_slug == *slug)
                })
            })
            .take(usize::try_from(first).unwrap_or(usize::MAX))
            .map(|(product, _)| product.clone())
            .collect();

        Ok(products)
    }

    async fn product_listings(&self, id: &str) -> Result<Vec<ChannelListing>, CatalogError> {
        let state = self.state.read().await;

        state
            .products
            .iter()
            .find(|(product, _)| product.id == id)
            .map(|(_, listings)| listings.clone())
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    #[instrument(skip(self, items))]
    async fn update_metadata(
        &self,
        id: &str,
        items: Vec<MetadataItem>,
    ) -> Result<Vec<MetadataItem>, CatalogError> {
        let mut state = self.state.write().await;
        let MemoryState { channels, products } = &mut *state;

        let metadata = channels
            .iter_mut()
            .find(|channel| channel.id == id)
            .map(|channel| &mut channel.metadata)
            .or_else(|| {
                products
                    .iter_mut()
                    .find(|(product, _)| product.id == id)
                    .map(|(product, _)| &mut product.metadata)
            })
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        merge_metadata(metadata, items);

        Ok(metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn demo_catalog_exposes_markups_and_rules_as_metadata() -> TestResult {
        let catalog = MemoryCatalog::demo()?;

        let moscow = catalog.channel("Q2hhbm5lbDoy").await?.ok_or("missing channel")?;

        assert_eq!(moscow.metadata_value(MARKUP_METADATA_KEY), Some("15"));
        assert_eq!(moscow.metadata_value(SUBDOMAIN_METADATA_KEY), Some("moscow"));

        let product = catalog.product("UHJvZHVjdDox").await?.ok_or("missing product")?;
        let rules = product
            .metadata_value(DISCOUNTS_METADATA_KEY)
            .ok_or("missing rules")?;

        assert!(rules.contains(r#""shedule":"* * * * *""#));

        Ok(())
    }

    #[tokio::test]
    async fn lists_products_by_channel() -> TestResult {
        let catalog = MemoryCatalog::demo()?;

        let all = catalog.list_products(None, 100).await?;
        let spb = catalog.list_products(Some("spb".to_string()), 100).await?;
        let first = catalog.list_products(None, 1).await?;

        assert_eq!(all.len(), 2);
        assert_eq!(
            spb.iter().map(|product| product.id.as_str()).collect::<Vec<_>>(),
            vec!["UHJvZHVjdDox"]
        );
        assert_eq!(first.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn listings_carry_channel_slug_and_price() -> TestResult {
        let catalog = MemoryCatalog::demo()?;

        let listings = catalog.product_listings("UHJvZHVjdDoy").await?;

        assert_eq!(listings.len(), 2);
        assert!(listings.iter().all(|listing| listing.price == Decimal::new(250, 0)));
        assert_eq!(
            listings
                .iter()
                .map(|listing| listing.channel_slug.as_str())
                .collect::<Vec<_>>(),
            vec!["default-channel", "moscow"]
        );
        assert!(matches!(
            catalog.product_listings("missing").await,
            Err(CatalogError::NotFound(id)) if id == "missing"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn metadata_updates_persist() -> TestResult {
        let catalog = MemoryCatalog::demo()?;

        let stored = catalog
            .update_metadata(
                "Q2hhbm5lbDox",
                vec![MetadataItem::new(MARKUP_METADATA_KEY, "7.50")],
            )
            .await?;

        assert!(stored.contains(&MetadataItem::new(MARKUP_METADATA_KEY, "7.50")));

        let channel = catalog.channel("Q2hhbm5lbDox").await?.ok_or("missing channel")?;

        assert_eq!(channel.metadata_value(MARKUP_METADATA_KEY), Some("7.50"));
        assert!(matches!(
            catalog.update_metadata("missing", Vec::new()).await,
            Err(CatalogError::NotFound(_))
        ));

        Ok(())
    }
}
