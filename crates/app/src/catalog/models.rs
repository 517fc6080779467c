//! Catalog Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Channel metadata key holding the storefront subdomain.
pub const SUBDOMAIN_METADATA_KEY: &str = "subdomain";

/// Key/value metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

impl MetadataItem {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Sales Channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub metadata: Vec<MetadataItem>,
}

impl Channel {
    /// Value stored under `key`, if any.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        metadata_value(&self.metadata, key)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub metadata: Vec<MetadataItem>,
}

impl Product {
    /// Value stored under `key`, if any.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        metadata_value(&self.metadata, key)
    }
}

/// Price of a product in one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelListing {
    pub channel_id: String,
    pub channel_slug: String,
    pub price: Decimal,
    pub currency: String,
}

/// Upsert `items` into `metadata`, keeping the position of existing keys.
pub(crate) fn merge_metadata(metadata: &mut Vec<MetadataItem>, items: Vec<MetadataItem>) {
    for item in items {
        match metadata.iter_mut().find(|existing| existing.key == item.key) {
            Some(existing) => existing.value = item.value,
            None => metadata.push(item),
        }
    }
}

fn metadata_value<'a>(metadata: &'a [MetadataItem], key: &str) -> Option<&'a str> {
    metadata
        .iter()
        .find(|item| item.key == key)
        .map(|item| item.value.as_str())
}
