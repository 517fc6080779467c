//! Catalog
//!
//! Access to the external commerce catalog: channels, products, their channel listings and the
//! metadata items markups and discounts are stored in.

pub mod errors;
mod graphql;
mod memory;
pub mod models;

pub use errors::CatalogError;
pub use graphql::{GraphQlCatalog, GraphQlConfig};
pub use memory::MemoryCatalog;

use async_trait::async_trait;
use mockall::automock;

use crate::catalog::models::{Channel, ChannelListing, MetadataItem, Product};

/// Number of products fetched per listing request unless asked otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[automock]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Retrieve a single channel, `None` when it does not exist.
    async fn channel(&self, id: &str) -> Result<Option<Channel>, CatalogError>;

    /// Retrieve all channels.
    async fn list_channels(&self) -> Result<Vec<Channel>, CatalogError>;

    /// Retrieve a single product, `None` when it does not exist.
    async fn product(&self, id: &str) -> Result<Option<Product>, CatalogError>;

    /// Retrieve up to `first` products, optionally only those listed in a channel.
    async fn list_products(
        &self,
        channel_slug: Option<String>,
        first: u32,
    ) -> Result<Vec<Product>, CatalogError>;

    /// Retrieve the prices of a product in each channel it is listed in.
    async fn product_listings(&self, id: &str) -> Result<Vec<ChannelListing>, CatalogError>;

    /// Upsert metadata items on a channel or product, returning the stored metadata.
    async fn update_metadata(
        &self,
        id: &str,
        items: Vec<MetadataItem>,
    ) -> Result<Vec<MetadataItem>, CatalogError>;
}
