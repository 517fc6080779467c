//! GraphQL catalog client.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::catalog::{
    CatalogClient, CatalogError,
    models::{Channel, ChannelListing, MetadataItem, Product},
};

const CHANNEL_QUERY: &str = "
query GetChannel($id: ID!) {
    channel(id: $id) { id name slug metadata { key value } }
}";

const CHANNELS_QUERY: &str = "
query ListChannels {
    channels { id name slug metadata { key value } }
}";

const PRODUCT_QUERY: &str = "
query GetProduct($id: ID!) {
    product(id: $id) { id name slug metadata { key value } }
}";

const PRODUCTS_QUERY: &str = "
query ListProducts($first: Int!, $channel: String) {
    products(first: $first, channel: $channel) {
        edges { node { id name slug metadata { key value } } }
    }
}";

const PRODUCT_LISTINGS_QUERY: &str = "
query GetProductListings($id: ID!) {
    product(id: $id) {
        variants {
            channelListings {
                channel { id slug }
                price { amount currency }
            }
        }
    }
}";

const UPDATE_METADATA_MUTATION: &str = "
mutation UpdateMetadata($id: ID!, $input: [MetadataInput!]!) {
    updateMetadata(id: $id, input: $input) {
        item { metadata { key value } }
        errors { field message }
    }
}";

/// Connection settings for a GraphQL catalog API.
#[derive(Debug, Clone)]
pub struct GraphQlConfig {
    /// GraphQL endpoint, e.g. `"https://shop.example.com/graphql/"`.
    pub api_url: String,

    /// App token sent as a bearer token.
    pub token: String,
}

/// HTTP client for a Saleor-compatible GraphQL API.
#[derive(Debug, Clone)]
pub struct GraphQlCatalog {
    config: GraphQlConfig,
    http: Client,
}

impl GraphQlCatalog {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: GraphQlConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    async fn execute<T>(&self, query: &str, variables: Value) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let body = json!({ "query": query, "variables": variables });

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(CatalogError::UnexpectedResponse(format!(
                "request failed with status {status}: {text}"
            )));
        }

        let parsed: GraphQlResponse<T> = response.json().await?;

        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            return Err(CatalogError::Api(join_messages(&errors)));
        }

        parsed
            .data
            .ok_or_else(|| CatalogError::UnexpectedResponse("response has no data".to_string()))
    }
}

#[async_trait]
impl CatalogClient for GraphQlCatalog {
    #[instrument(skip(self))]
    async fn channel(&self, id: &str) -> Result<Option<Channel>, CatalogError> {
        let data: ChannelData = self.execute(CHANNEL_QUERY, json!({ "id": id })).await?;

        Ok(data.channel)
    }

    #[instrument(skip(self))]
    async fn list_channels(&self) -> Result<Vec<Channel>, CatalogError> {
        let data: ChannelsData = self.execute(CHANNELS_QUERY, json!({})).await?;

        Ok(data.channels.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn product(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        let data: ProductData = self.execute(PRODUCT_QUERY, json!({ "id": id })).await?;

        Ok(data.product)
    }

    #[instrument(skip(self))]
    async fn list_products(
        &self,
        channel_slug: Option<String>,
        first: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        let data: ProductsData = self
            .execute(
                PRODUCTS_QUERY,
                json!({ "first": first, "channel": channel_slug }),
            )
            .await?;

        let products = data
            .products
            .map(|connection| {
                connection
                    .edges
                    .into_iter()
                    .map(|edge| edge.node)
                    .collect()
            })
            .unwrap_or_default();

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn product_listings(&self, id: &str) -> Result<Vec<ChannelListing>, CatalogError> {
        let data: ProductListingsData = self
            .execute(PRODUCT_LISTINGS_QUERY, json!({ "id": id }))
            .await?;

        let Some(product) = data.product else {
            return Err(CatalogError::NotFound(id.to_string()));
        };

        let listings = collect_listings(product.variants.unwrap_or_default());

        debug!(count = listings.len(), "fetched channel listings");

        Ok(listings)
    }

    #[instrument(skip(self, items))]
    async fn update_metadata(
        &self,
        id: &str,
        items: Vec<MetadataItem>,
    ) -> Result<Vec<MetadataItem>, CatalogError> {
        let data: UpdateMetadataData = self
            .execute(UPDATE_METADATA_MUTATION, json!({ "id": id, "input": items }))
            .await?;

        let Some(payload) = data.update_metadata else {
            return Err(CatalogError::UnexpectedResponse(
                "updateMetadata returned nothing".to_string(),
            ));
        };

        if !payload.errors.is_empty() {
            return Err(CatalogError::MetadataRejected(join_messages(
                &payload.errors,
            )));
        }

        let Some(item) = payload.item else {
            return Err(CatalogError::NotFound(id.to_string()));
        };

        Ok(item.metadata)
    }
}

/// One listing per channel; the first variant listed in a channel sets its price.
fn collect_listings(variants: Vec<VariantNode>) -> Vec<ChannelListing> {
    let mut seen = FxHashSet::default();

    variants
        .into_iter()
        .flat_map(|variant| variant.channel_listings.unwrap_or_default())
        .filter_map(|listing| {
            let price = listing.price?;

            seen.insert(listing.channel.id.clone())
                .then(|| ChannelListing {
                    channel_id: listing.channel.id,
                    channel_slug: listing.channel.slug,
                    price: price.amount,
                    currency: price.currency,
                })
        })
        .collect()
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChannelData {
    channel: Option<Channel>,
}

#[derive(Debug, Deserialize)]
struct ChannelsData {
    channels: Option<Vec<Channel>>,
}

#[derive(Debug, Deserialize)]
struct ProductData {
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Option<ProductConnection>,
}

#[derive(Debug, Deserialize)]
struct ProductConnection {
    edges: Vec<ProductEdge>,
}

#[derive(Debug, Deserialize)]
struct ProductEdge {
    node: Product,
}

#[derive(Debug, Deserialize)]
struct ProductListingsData {
    product: Option<ProductVariants>,
}

#[derive(Debug, Deserialize)]
struct ProductVariants {
    variants: Option<Vec<VariantNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    channel_listings: Option<Vec<VariantListing>>,
}

#[derive(Debug, Deserialize)]
struct VariantListing {
    channel: ChannelRef,
    price: Option<PriceNode>,
}

#[derive(Debug, Deserialize)]
struct ChannelRef {
    id: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct PriceNode {
    #[serde(deserialize_with = "tariff::numbers::deserialize_decimal")]
    amount: Decimal,
    currency: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMetadataData {
    update_metadata: Option<UpdateMetadataPayload>,
}

#[derive(Debug, Deserialize)]
struct UpdateMetadataPayload {
    item: Option<MetadataHolder>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct MetadataHolder {
    metadata: Vec<MetadataItem>,
}
