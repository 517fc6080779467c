//! Markups service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use tariff::markups::{MARKUP_METADATA_KEY, MarkupPercent};
use tracing::{debug, info, instrument};

use crate::{
    catalog::{
        CatalogClient,
        models::{Channel, MetadataItem, SUBDOMAIN_METADATA_KEY},
    },
    markups::{cache::MarkupCache, errors::MarkupsServiceError},
};

/// A channel together with its current markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelMarkup {
    #[serde(flatten)]
    pub channel: Channel,
    pub markup_percent: MarkupPercent,
}

/// Markups stored as channel metadata, read through a [`MarkupCache`].
pub struct CatalogMarkupsService {
    catalog: Arc<dyn CatalogClient>,
    cache: MarkupCache,
}

impl CatalogMarkupsService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogClient>, cache: MarkupCache) -> Self {
        Self { catalog, cache }
    }
}

fn stored_markup(channel: &Channel) -> Result<Option<MarkupPercent>, MarkupsServiceError> {
    channel
        .metadata_value(MARKUP_METADATA_KEY)
        .map(|value| {
            value
                .parse::<MarkupPercent>()
                .map_err(|source| MarkupsServiceError::InvalidStoredMarkup {
                    channel_id: channel.id.clone(),
                    source,
                })
        })
        .transpose()
}

#[async_trait]
impl MarkupsService for CatalogMarkupsService {
    #[instrument(skip(self))]
    async fn get_channel_markup(
        &self,
        channel_id: &str,
    ) -> Result<MarkupPercent, MarkupsServiceError> {
        if let Some(markup) = self.cache.get(channel_id).await {
            debug!(%markup, "markup cache hit");

            return Ok(markup);
        }

        let Some(channel) = self.catalog.channel(channel_id).await? else {
            debug!("unknown channel, no markup");

            return Ok(MarkupPercent::ZERO);
        };

        let Some(markup) = stored_markup(&channel)? else {
            return Ok(MarkupPercent::ZERO);
        };

        self.cache.insert(channel_id, markup).await;

        Ok(markup)
    }

    #[instrument(skip(self))]
    async fn set_channel_markup(
        &self,
        channel_id: &str,
        markup: MarkupPercent,
    ) -> Result<MarkupPercent, MarkupsServiceError> {
        let markup = markup.rounded();

        self.catalog
            .update_metadata(
                channel_id,
                vec![MetadataItem::new(MARKUP_METADATA_KEY, markup.to_string())],
            )
            .await?;

        self.cache.insert(channel_id, markup).await;

        info!(%markup, "channel markup updated");

        Ok(markup)
    }

    #[instrument(skip(self))]
    async fn invalidate_channel(&self, channel_id: &str) {
        if self.cache.invalidate(channel_id).await {
            debug!("markup cache entry dropped");
        }
    }

    async fn list_channels_with_markups(&self) -> Result<Vec<ChannelMarkup>, MarkupsServiceError> {
        self.catalog
            .list_channels()
            .await?
            .into_iter()
            .map(|channel| {
                let markup_percent = stored_markup(&channel)?.unwrap_or(MarkupPercent::ZERO);

                Ok(ChannelMarkup {
                    channel,
                    markup_percent,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn channel_by_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<Channel>, MarkupsServiceError> {
        let channels = self.catalog.list_channels().await?;

        Ok(channels
            .into_iter()
            .find(|channel| channel.metadata_value(SUBDOMAIN_METADATA_KEY) == Some(subdomain)))
    }
}

#[automock]
#[async_trait]
pub trait MarkupsService: Send + Sync {
    /// Markup of a channel. Channels without a stored markup, or unknown to the catalog, have
    /// none.
    async fn get_channel_markup(&self, channel_id: &str)
    -> Result<MarkupPercent, MarkupsServiceError>;

    /// Store a channel's markup, rounded to two decimal places, and return the stored value.
    async fn set_channel_markup(
        &self,
        channel_id: &str,
        markup: MarkupPercent,
    ) -> Result<MarkupPercent, MarkupsServiceError>;

    /// Forget any cached markup of a channel.
    async fn invalidate_channel(&self, channel_id: &str);

    /// All channels with their stored markups.
    async fn list_channels_with_markups(&self) -> Result<Vec<ChannelMarkup>, MarkupsServiceError>;

    /// The channel whose `subdomain` metadata matches.
    async fn channel_by_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<Channel>, MarkupsServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::catalog::{CatalogError, MockCatalogClient};

    use super::*;

    fn channel(id: &str, metadata: Vec<MetadataItem>) -> Channel {
        Channel {
            id: id.to_string(),
            name: format!("Channel {id}"),
            slug: id.to_lowercase(),
            metadata,
        }
    }

    fn service(catalog: MockCatalogClient) -> CatalogMarkupsService {
        CatalogMarkupsService::new(Arc::new(catalog), MarkupCache::default())
    }

    #[tokio::test]
    async fn reads_markup_once_within_ttl() -> TestResult {
        let mut catalog = MockCatalogClient::new();

        catalog
            .expect_channel()
            .once()
            .withf(|id| id == "Q2hhbm5lbDoy")
            .return_once(|id| {
                Ok(Some(channel(
                    id,
                    vec![MetadataItem::new(MARKUP_METADATA_KEY, "15")],
                )))
            });

        let service = service(catalog);

        assert_eq!(
            service.get_channel_markup("Q2hhbm5lbDoy").await?.value(),
            Decimal::new(15, 0)
        );
        assert_eq!(
            service.get_channel_markup("Q2hhbm5lbDoy").await?.value(),
            Decimal::new(15, 0)
        );

        Ok(())
    }

    #[tokio::test]
    async fn refreshes_after_invalidation() -> TestResult {
        let mut catalog = MockCatalogClient::new();
        let mut values = vec!["20", "10"];

        catalog.expect_channel().times(2).returning(move |id| {
            let value = values.pop().unwrap_or_default();

            Ok(Some(channel(
                id,
                vec![MetadataItem::new(MARKUP_METADATA_KEY, value)],
            )))
        });

        let service = service(catalog);

        assert_eq!(
            service.get_channel_markup("Q2hhbm5lbDoz").await?.value(),
            Decimal::new(10, 0)
        );

        service.invalidate_channel("Q2hhbm5lbDoz").await;

        assert_eq!(
            service.get_channel_markup("Q2hhbm5lbDoz").await?.value(),
            Decimal::new(20, 0)
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_channel_or_key_means_no_markup() -> TestResult {
        let mut catalog = MockCatalogClient::new();

        catalog
            .expect_channel()
            .withf(|id| id == "missing")
            .returning(|_| Ok(None));
        catalog
            .expect_channel()
            .withf(|id| id == "bare")
            .times(2)
            .returning(|id| Ok(Some(channel(id, Vec::new()))));

        let service = service(catalog);

        assert_eq!(service.get_channel_markup("missing").await?, MarkupPercent::ZERO);
        assert_eq!(service.get_channel_markup("bare").await?, MarkupPercent::ZERO);
        // Absent markups are not cached.
        assert_eq!(service.get_channel_markup("bare").await?, MarkupPercent::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_stored_markup_is_reported() {
        let mut catalog = MockCatalogClient::new();

        catalog.expect_channel().once().return_once(|id| {
            Ok(Some(channel(
                id,
                vec![MetadataItem::new(MARKUP_METADATA_KEY, "lots")],
            )))
        });

        let result = service(catalog).get_channel_markup("Q2hhbm5lbDox").await;

        assert!(matches!(
            result,
            Err(MarkupsServiceError::InvalidStoredMarkup { channel_id, .. })
                if channel_id == "Q2hhbm5lbDox"
        ));
    }

    #[tokio::test]
    async fn set_rounds_stores_and_caches() -> TestResult {
        let mut catalog = MockCatalogClient::new();

        catalog
            .expect_update_metadata()
            .once()
            .withf(|id, items| {
                id == "Q2hhbm5lbDox"
                    && *items == vec![MetadataItem::new(MARKUP_METADATA_KEY, "12.35")]
            })
            .return_once(|_, items| Ok(items));
        catalog.expect_channel().never();

        let service = service(catalog);

        let stored = service
            .set_channel_markup("Q2hhbm5lbDox", MarkupPercent::new(Decimal::new(123_456, 4))?)
            .await?;

        assert_eq!(stored.value(), Decimal::new(1235, 2));
        assert_eq!(service.get_channel_markup("Q2hhbm5lbDox").await?, stored);

        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_cache_alone() -> TestResult {
        let mut catalog = MockCatalogClient::new();

        catalog
            .expect_update_metadata()
            .once()
            .return_once(|_, _| Err(CatalogError::MetadataRejected("read only".to_string())));
        catalog
            .expect_channel()
            .once()
            .return_once(|id| Ok(Some(channel(id, Vec::new()))));

        let service = service(catalog);

        let result = service
            .set_channel_markup("Q2hhbm5lbDox", MarkupPercent::new(Decimal::new(5, 0))?)
            .await;

        assert!(matches!(result, Err(MarkupsServiceError::Catalog(_))));
        assert_eq!(service.get_channel_markup("Q2hhbm5lbDox").await?, MarkupPercent::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn lists_channels_and_finds_by_subdomain() -> TestResult {
        let mut catalog = MockCatalogClient::new();

        catalog.expect_list_channels().times(2).returning(|| {
            Ok(vec![
                channel("Q2hhbm5lbDox", Vec::new()),
                channel(
                    "Q2hhbm5lbDoy",
                    vec![
                        MetadataItem::new(MARKUP_METADATA_KEY, "15"),
                        MetadataItem::new(SUBDOMAIN_METADATA_KEY, "moscow"),
                    ],
                ),
            ])
        });

        let service = service(catalog);

        let listed = service.list_channels_with_markups().await?;

        assert_eq!(
            listed
                .iter()
                .map(|entry| entry.markup_percent.value())
                .collect::<Vec<_>>(),
            vec![Decimal::ZERO, Decimal::new(15, 0)]
        );

        let found = service.channel_by_subdomain("moscow").await?;

        assert_eq!(found.map(|channel| channel.id), Some("Q2hhbm5lbDoy".to_string()));

        Ok(())
    }
}
