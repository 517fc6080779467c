//! Pricing
//!
//! Final price composition: a channel markup followed by an optional capped discount, rounded
//! to two decimal places. All arithmetic is exact decimal arithmetic.

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::{
    discounts::{DiscountRule, select_active_discount},
    markups::{MarkupError, MarkupPercent},
    numbers::parse_decimal,
};

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Errors that can occur while composing a price.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The base price is zero or negative.
    #[error("base price must be positive, got {0}")]
    NonPositiveBasePrice(Decimal),

    /// A numeric input was not a number.
    #[error("{field} is not a number: {value:?}")]
    InvalidNumber {
        /// Name of the input.
        field: &'static str,

        /// Offending text.
        value: String,
    },

    /// Invalid markup percentage.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// An intermediate value exceeded the decimal range.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// Unknown ISO 4217 currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Parse a numeric input, naming it in the error.
///
/// # Errors
///
/// Returns [`PricingError::InvalidNumber`] if `value` is not a decimal number.
pub fn parse_decimal_field(field: &'static str, value: &str) -> Result<Decimal, PricingError> {
    parse_decimal(value).ok_or_else(|| PricingError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Look up an ISO 4217 currency by code, ignoring case.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] for unknown codes.
pub fn find_currency(code: &str) -> Result<&'static Currency, PricingError> {
    iso::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| PricingError::UnknownCurrency(code.to_string()))
}

/// Apply a channel markup: `price * (1 + markup / 100)`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the result does not fit in a decimal.
pub fn apply_markup(price: Decimal, markup: MarkupPercent) -> Result<Decimal, PricingError> {
    price
        .checked_mul(markup.factor())
        .ok_or(PricingError::Overflow)
}

/// Apply a discount rule's percentage, then clamp against its cap.
///
/// A positive percentage treats the cap as a ceiling, a negative one as a floor. A cap that is
/// zero or negative, or a zero percentage, leaves the adjusted price unclamped.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the result does not fit in a decimal.
pub fn apply_discount(price: Decimal, rule: &DiscountRule) -> Result<Decimal, PricingError> {
    let factor = rule
        .percent
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|fraction| Decimal::ONE.checked_add(fraction))
        .ok_or(PricingError::Overflow)?;

    let adjusted = price.checked_mul(factor).ok_or(PricingError::Overflow)?;

    if rule.cap <= Decimal::ZERO {
        return Ok(adjusted);
    }

    Ok(if rule.percent > Decimal::ZERO {
        adjusted.min(rule.cap)
    } else if rule.percent < Decimal::ZERO {
        adjusted.max(rule.cap)
    } else {
        adjusted
    })
}

/// Round to exactly two decimal places, ties to even.
#[must_use]
pub fn round_price(price: Decimal) -> Decimal {
    let mut rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

/// Compose the final price from a base price, a channel markup and an optional discount.
///
/// # Errors
///
/// - [`PricingError::NonPositiveBasePrice`]: `base_price` is zero or negative.
/// - [`PricingError::Overflow`]: an intermediate value does not fit in a decimal.
pub fn compose(
    base_price: Decimal,
    markup: MarkupPercent,
    discount: Option<&DiscountRule>,
) -> Result<Decimal, PricingError> {
    if base_price <= Decimal::ZERO {
        return Err(PricingError::NonPositiveBasePrice(base_price));
    }

    let priced = apply_markup(base_price, markup)?;

    let adjusted = match discount {
        Some(rule) => apply_discount(priced, rule)?,
        None => priced,
    };

    Ok(round_price(adjusted))
}

/// Inputs of a single price evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuery {
    /// Product identifier.
    pub product_id: String,

    /// Channel identifier.
    pub channel_id: String,

    /// Price before markup and discount.
    pub base_price: Decimal,

    /// Channel markup.
    pub markup: MarkupPercent,

    /// Currency of all amounts.
    pub currency: &'static Currency,
}

impl PriceQuery {
    /// Create a query priced in [`DEFAULT_CURRENCY`].
    pub fn new(
        product_id: impl Into<String>,
        channel_id: impl Into<String>,
        base_price: Decimal,
        markup: MarkupPercent,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            channel_id: channel_id.into(),
            base_price,
            markup,
            currency: iso::USD,
        }
    }

    /// Create a query from textual base price and markup.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidNumber`]: `base_price` is not a number.
    /// - [`PricingError::Markup`]: `markup` is not a number or is out of range.
    pub fn parse(
        product_id: impl Into<String>,
        channel_id: impl Into<String>,
        base_price: &str,
        markup: &str,
    ) -> Result<Self, PricingError> {
        let base_price = parse_decimal_field("base_price", base_price)?;
        let markup = markup.parse::<MarkupPercent>()?;

        Ok(Self::new(product_id, channel_id, base_price, markup))
    }

    /// Use a different currency.
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// Outcome of a price evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceCalculation {
    /// Product identifier.
    pub product_id: String,

    /// Channel identifier.
    pub channel_id: String,

    /// Price before markup and discount.
    pub base_price: Decimal,

    /// Channel markup applied.
    pub markup_percent: MarkupPercent,

    /// Final price, two decimal places.
    pub final_price: Decimal,

    /// Currency of all amounts.
    #[serde(serialize_with = "serialize_currency")]
    pub currency: &'static Currency,

    /// Whether a discount rule was applied.
    pub discount_applied: bool,

    /// Percentage of the applied rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Decimal>,

    /// The applied rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_discount: Option<DiscountRule>,
}

impl PriceCalculation {
    /// Final price as money.
    #[must_use]
    pub fn final_money(&self) -> Money<'static, Currency> {
        Money::from_decimal(self.final_price, self.currency)
    }
}

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "signature imposed by serde's serialize_with"
)]
fn serialize_currency<S>(currency: &&'static Currency, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(currency.iso_alpha_code)
}

/// Select the active rule at `now` and compose the final price.
///
/// # Errors
///
/// Propagates [`compose`] errors.
pub fn evaluate_price(
    query: &PriceQuery,
    rules: &[DiscountRule],
    now: Timestamp,
) -> Result<PriceCalculation, PricingError> {
    let discount = select_active_discount(rules, now);
    let final_price = compose(query.base_price, query.markup, discount)?;

    debug!(
        product_id = %query.product_id,
        channel_id = %query.channel_id,
        %final_price,
        discount_applied = discount.is_some(),
        "evaluated price"
    );

    Ok(PriceCalculation {
        product_id: query.product_id.clone(),
        channel_id: query.channel_id.clone(),
        base_price: query.base_price,
        markup_percent: query.markup,
        final_price,
        currency: query.currency,
        discount_applied: discount.is_some(),
        discount_percent: discount.map(|rule| rule.percent),
        active_discount: discount.cloned(),
    })
}

/// One entry of a batch evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// Price inputs.
    pub query: PriceQuery,

    /// Rules of the product, in priority order.
    pub rules: Vec<DiscountRule>,
}

/// Evaluate independent price queries, one result per item in input order.
#[must_use]
pub fn evaluate_batch(
    items: &[BatchItem],
    now: Timestamp,
) -> Vec<Result<PriceCalculation, PricingError>> {
    items
        .iter()
        .map(|item| evaluate_price(&item.query, &item.rules, now))
        .collect()
}
