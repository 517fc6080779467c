//! Catalog Config

use std::path::PathBuf;

use clap::Args;
use jiff::SignedDuration;
use tariff::pricing::DEFAULT_CURRENCY;

/// Token value shipped in example configuration; treated as no token.
pub const PLACEHOLDER_APP_TOKEN: &str = "your_saleor_app_token_here";

/// Catalog connection and pricing settings.
#[derive(Debug, Clone, Args)]
pub struct CatalogConfig {
    /// Catalog GraphQL endpoint
    #[arg(
        long,
        env = "SALEOR_API_URL",
        default_value = "http://localhost:8000/graphql/",
        global = true
    )]
    pub api_url: String,

    /// Catalog app token; without one the demo catalog is used
    #[arg(
        long,
        env = "SALEOR_APP_TOKEN",
        hide_env_values = true,
        default_value = "",
        global = true
    )]
    pub app_token: String,

    /// YAML catalog to use in demo mode instead of the bundled one
    #[arg(long, env = "DEMO_FIXTURES_PATH", global = true)]
    pub demo_fixtures_path: Option<PathBuf>,

    /// Seconds a channel markup read from the catalog is cached
    #[arg(
        long,
        env = "MARKUP_CACHE_TTL_SECONDS",
        default_value_t = 3600,
        global = true
    )]
    pub markup_cache_ttl_seconds: u64,

    /// ISO 4217 currency of calculated prices
    #[arg(long, env = "PRICE_CURRENCY", default_value = DEFAULT_CURRENCY, global = true)]
    pub price_currency: String,
}

impl CatalogConfig {
    /// Whether no usable token is configured.
    #[must_use]
    pub fn demo_mode(&self) -> bool {
        let token = self.app_token.trim();

        token.is_empty() || token == PLACEHOLDER_APP_TOKEN
    }

    #[must_use]
    pub fn markup_cache_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(i64::try_from(self.markup_cache_ttl_seconds).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        catalog: CatalogConfig,
    }

    #[test]
    fn demo_mode_without_real_token() {
        let blank = TestCli::parse_from(["test", "--app-token", " "]);
        let placeholder = TestCli::parse_from(["test", "--app-token", PLACEHOLDER_APP_TOKEN]);
        let real = TestCli::parse_from(["test", "--app-token", "secret"]);

        assert!(blank.catalog.demo_mode());
        assert!(placeholder.catalog.demo_mode());
        assert!(!real.catalog.demo_mode());
    }

    #[test]
    fn ttl_from_seconds() {
        let cli = TestCli::parse_from(["test", "--markup-cache-ttl-seconds", "90"]);

        assert_eq!(cli.catalog.markup_cache_ttl(), SignedDuration::from_secs(90));
    }
}
