//! Fixtures
//!
//! YAML catalog data: channels with their markups and products with their channel listings and
//! discount rules. Used for the demo catalog and in tests.

use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;

pub mod channels;
pub mod products;

pub use channels::ChannelFixture;
pub use products::{ListingFixture, ProductFixture, parse_price};

/// Bundled demo catalog.
pub const DEMO_CATALOG: &str = include_str!("../../fixtures/catalog/demo.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Two channels or two products share an ID
    #[error("Duplicate ID: {0}")]
    DuplicateId(String),

    /// A listing references a channel that is not defined
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// Discount rules could not be encoded as metadata
    #[error("Failed to encode discount rules: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Catalog Fixture
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFixture {
    /// Channels, in display order
    #[serde(default)]
    pub channels: Vec<ChannelFixture>,

    /// Products, in display order
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

impl CatalogFixture {
    /// Parse and check a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, an ID is repeated, a listing references an
    /// unknown channel or a listing price cannot be parsed.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let catalog: Self = serde_norway::from_str(contents)?;

        catalog.check()?;

        Ok(catalog)
    }

    /// The bundled demo catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog fails to parse.
    pub fn demo() -> Result<Self, FixtureError> {
        Self::from_yaml(DEMO_CATALOG)
    }

    /// Channel with the given ID.
    pub fn channel(&self, id: &str) -> Option<&ChannelFixture> {
        self.channels.iter().find(|channel| channel.id == id)
    }

    /// Product with the given ID.
    pub fn product(&self, id: &str) -> Option<&ProductFixture> {
        self.products.iter().find(|product| product.id == id)
    }

    fn check(&self) -> Result<(), FixtureError> {
        let mut channels: FxHashSet<&str> = FxHashSet::default();

        for channel in &self.channels {
            if !channels.insert(channel.id.as_str()) {
                return Err(FixtureError::DuplicateId(channel.id.clone()));
            }
        }

        let mut products: FxHashSet<&str> = FxHashSet::default();

        for product in &self.products {
            if !products.insert(product.id.as_str()) {
                return Err(FixtureError::DuplicateId(product.id.clone()));
            }

            for listing in &product.listings {
                if !channels.contains(listing.channel.as_str()) {
                    return Err(FixtureError::ChannelNotFound(listing.channel.clone()));
                }

                listing.parse_price()?;
            }
        }

        Ok(())
    }
}
