//! Markup cache.

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;
use tariff::markups::MarkupPercent;
use tokio::sync::RwLock;

/// How long a markup read from the catalog is trusted.
pub const DEFAULT_MARKUP_TTL: SignedDuration = SignedDuration::from_hours(1);

#[derive(Debug, Clone, Copy)]
struct CachedMarkup {
    markup: MarkupPercent,
    expires_at: Timestamp,
}

/// Per-channel markups with a time to live.
#[derive(Debug)]
pub struct MarkupCache {
    ttl: SignedDuration,
    entries: RwLock<FxHashMap<String, CachedMarkup>>,
}

impl Default for MarkupCache {
    fn default() -> Self {
        Self::new(DEFAULT_MARKUP_TTL)
    }
}

impl MarkupCache {
    #[must_use]
    pub fn new(ttl: SignedDuration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Cached markup of a channel, if present and not expired at `now`.
    pub async fn get_at(&self, channel_id: &str, now: Timestamp) -> Option<MarkupPercent> {
        self.entries
            .read()
            .await
            .get(channel_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.markup)
    }

    /// Cache a channel's markup from `now` until the TTL elapses. Entries already expired at
    /// `now` are evicted.
    pub async fn insert_at(&self, channel_id: &str, markup: MarkupPercent, now: Timestamp) {
        let expires_at = now.checked_add(self.ttl).unwrap_or(Timestamp::MAX);

        let mut entries = self.entries.write().await;

        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(channel_id.to_string(), CachedMarkup { markup, expires_at });
    }

    pub async fn get(&self, channel_id: &str) -> Option<MarkupPercent> {
        self.get_at(channel_id, Timestamp::now()).await
    }

    pub async fn insert(&self, channel_id: &str, markup: MarkupPercent) {
        self.insert_at(channel_id, markup, Timestamp::now()).await;
    }

    /// Drop a channel's entry. Returns whether one was present.
    pub async fn invalidate(&self, channel_id: &str) -> bool {
        self.entries.write().await.remove(channel_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn entries_expire_after_ttl() -> TestResult {
        let cache = MarkupCache::new(SignedDuration::from_secs(60));
        let now: Timestamp = "2025-06-15T12:00:00Z".parse()?;
        let markup = MarkupPercent::new(Decimal::new(15, 0))?;

        cache.insert_at("Q2hhbm5lbDoy", markup, now).await;

        assert_eq!(
            cache
                .get_at("Q2hhbm5lbDoy", now.checked_add(SignedDuration::from_secs(59))?)
                .await,
            Some(markup)
        );
        assert_eq!(
            cache
                .get_at("Q2hhbm5lbDoy", now.checked_add(SignedDuration::from_secs(60))?)
                .await,
            None
        );

        Ok(())
    }

    #[tokio::test]
    async fn insert_evicts_expired_entries() -> TestResult {
        let cache = MarkupCache::new(SignedDuration::from_secs(60));
        let now: Timestamp = "2025-06-15T12:00:00Z".parse()?;
        let markup = MarkupPercent::new(Decimal::new(15, 0))?;

        cache.insert_at("Q2hhbm5lbDoy", markup, now).await;
        cache
            .insert_at("Q2hhbm5lbDoz", markup, now.checked_add(SignedDuration::from_secs(30))?)
            .await;
        cache
            .insert_at("Q2hhbm5lbDo0", markup, now.checked_add(SignedDuration::from_secs(61))?)
            .await;

        assert!(!cache.invalidate("Q2hhbm5lbDoy").await);
        assert!(cache.invalidate("Q2hhbm5lbDoz").await);
        assert!(cache.invalidate("Q2hhbm5lbDo0").await);

        Ok(())
    }

    #[tokio::test]
    async fn invalidate_removes_entry() -> TestResult {
        let cache = MarkupCache::default();
        let markup = MarkupPercent::new(Decimal::new(10, 0))?;

        cache.insert("Q2hhbm5lbDoz", markup).await;

        assert_eq!(cache.get("Q2hhbm5lbDoz").await, Some(markup));
        assert!(cache.invalidate("Q2hhbm5lbDoz").await);
        assert!(!cache.invalidate("Q2hhbm5lbDoz").await);
        assert_eq!(cache.get("Q2hhbm5lbDoz").await, None);

        Ok(())
    }
}
