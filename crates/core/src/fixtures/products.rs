//! Product Fixtures

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{discounts::DiscountRule, fixtures::FixtureError, numbers::parse_decimal, pricing};

/// Product Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFixture {
    /// Catalog product ID
    pub id: String,

    /// Product name
    pub name: String,

    /// Product slug
    pub slug: String,

    /// Prices per channel
    #[serde(default)]
    pub listings: Vec<ListingFixture>,

    /// Discount rules, in priority order
    #[serde(default)]
    pub discounts: Vec<DiscountRule>,
}

/// Channel listing of a product
#[derive(Debug, Clone, Deserialize)]
pub struct ListingFixture {
    /// Channel ID
    pub channel: String,

    /// Listing price (e.g., "100.00 USD")
    pub price: String,
}

impl ListingFixture {
    /// Parsed listing price.
    ///
    /// # Errors
    ///
    /// See [`parse_price`].
    pub fn parse_price(&self) -> Result<(Decimal, &'static Currency), FixtureError> {
        parse_price(&self.price)
    }
}

/// Parse price string (e.g., "2.99 USD") into an amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = parse_decimal(amount).ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = pricing::find_currency(currency_code)
        .map_err(|_err| FixtureError::UnknownCurrency(currency_code.to_string()))?;

    Ok((amount, currency))
}
