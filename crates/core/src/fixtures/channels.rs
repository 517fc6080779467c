//! Channel Fixtures

use serde::Deserialize;

use crate::markups::MarkupPercent;

/// Channel Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelFixture {
    /// Catalog channel ID
    pub id: String,

    /// Channel name
    pub name: String,

    /// Channel slug
    pub slug: String,

    /// Channel markup, absent means none
    #[serde(default)]
    pub markup: Option<MarkupPercent>,

    /// Storefront subdomain routed to this channel
    #[serde(default)]
    pub subdomain: Option<String>,
}
