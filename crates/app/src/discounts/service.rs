//! Discounts service.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use jiff::Timestamp;
use mockall::automock;
use tariff::discounts::{
    DISCOUNTS_METADATA_KEY, DiscountRule, DiscountRuleInput, format_rules, parse_rules,
    select_active_discount, validate_rules,
};
use tracing::{info, instrument, warn};

use crate::{
    catalog::{
        CatalogClient,
        models::{MetadataItem, Product},
    },
    discounts::{
        errors::DiscountsServiceError,
        models::{DiscountsSummary, ProductDiscounts},
    },
};

/// Discount rules stored as product metadata.
pub struct CatalogDiscountsService {
    catalog: Arc<dyn CatalogClient>,
}

impl CatalogDiscountsService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    async fn product(&self, product_id: &str) -> Result<Product, DiscountsServiceError> {
        self.catalog
            .product(product_id)
            .await?
            .ok_or_else(|| DiscountsServiceError::ProductNotFound(product_id.to_string()))
    }
}

fn product_rules(product: &Product) -> Vec<DiscountRule> {
    parse_rules(product.metadata_value(DISCOUNTS_METADATA_KEY).unwrap_or_default())
}

fn encode(rules: &[DiscountRule]) -> Result<MetadataItem, DiscountsServiceError> {
    let value = format_rules(rules).map_err(DiscountsServiceError::Encode)?;

    Ok(MetadataItem::new(DISCOUNTS_METADATA_KEY, value))
}

#[async_trait]
impl DiscountsService for CatalogDiscountsService {
    #[instrument(skip(self))]
    async fn get_discount_rules(
        &self,
        product_id: &str,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError> {
        let product = self.product(product_id).await?;

        Ok(product_rules(&product))
    }

    #[instrument(skip(self, rules))]
    async fn set_discount_rules(
        &self,
        product_id: &str,
        rules: Vec<DiscountRuleInput>,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError> {
        let rules = validate_rules(&rules)?;

        self.catalog
            .update_metadata(product_id, vec![encode(&rules)?])
            .await?;

        info!(count = rules.len(), "discount rules updated");

        Ok(rules)
    }

    #[instrument(skip(self, rules))]
    async fn set_discount_rules_for_all(
        &self,
        rules: Vec<DiscountRuleInput>,
        channel_slug: Option<String>,
        first: u32,
    ) -> Result<DiscountsSummary, DiscountsServiceError> {
        let rules = validate_rules(&rules)?;
        let item = encode(&rules)?;

        let products = self.catalog.list_products(channel_slug, first).await?;

        let results = join_all(products.iter().map(|product| {
            self.catalog
                .update_metadata(&product.id, vec![item.clone()])
        }))
        .await;

        let mut updated_products = 0;

        for (product, result) in products.iter().zip(results) {
            match result {
                Ok(_) => updated_products += 1,
                Err(error) => {
                    warn!(product_id = %product.id, %error, "failed to update discount rules");
                }
            }
        }

        info!(
            total_products = products.len(),
            updated_products, "discount rules applied to products"
        );

        Ok(DiscountsSummary {
            total_products: products.len(),
            updated_products,
            discounts_count: rules.len(),
        })
    }

    #[instrument(skip(self))]
    async fn active_discount(
        &self,
        product_id: &str,
        now: Timestamp,
    ) -> Result<Option<DiscountRule>, DiscountsServiceError> {
        let rules = self.get_discount_rules(product_id).await?;

        Ok(select_active_discount(&rules, now).cloned())
    }

    #[instrument(skip(self))]
    async fn list_products_with_discounts(
        &self,
        channel_slug: Option<String>,
        first: u32,
        now: Timestamp,
    ) -> Result<Vec<ProductDiscounts>, DiscountsServiceError> {
        let products = self.catalog.list_products(channel_slug, first).await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let discounts = product_rules(&product);
                let active_discount = select_active_discount(&discounts, now).cloned();

                ProductDiscounts {
                    id: product.id,
                    name: product.name,
                    slug: product.slug,
                    discounts,
                    active_discount,
                }
            })
            .collect())
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Rules stored on a product, in priority order. Unreadable metadata means no rules.
    async fn get_discount_rules(
        &self,
        product_id: &str,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError>;

    /// Validate and store a product's rules. Nothing is written unless every rule is valid.
    async fn set_discount_rules(
        &self,
        product_id: &str,
        rules: Vec<DiscountRuleInput>,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError>;

    /// Validate and store the same rules on up to `first` products, optionally only those
    /// listed in a channel.
    async fn set_discount_rules_for_all(
        &self,
        rules: Vec<DiscountRuleInput>,
        channel_slug: Option<String>,
        first: u32,
    ) -> Result<DiscountsSummary, DiscountsServiceError>;

    /// First of a product's rules active at `now`.
    async fn active_discount(
        &self,
        product_id: &str,
        now: Timestamp,
    ) -> Result<Option<DiscountRule>, DiscountsServiceError>;

    /// Products with their rules and the rule active at `now`.
    async fn list_products_with_discounts(
        &self,
        channel_slug: Option<String>,
        first: u32,
        now: Timestamp,
    ) -> Result<Vec<ProductDiscounts>, DiscountsServiceError>;
}
