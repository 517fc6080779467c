//! Tariff prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    discounts::{
        DISCOUNTS_METADATA_KEY, DiscountRule, DiscountRuleInput, ValidationErrors, format_rules,
        parse_rules, select_active_discount, validate_rule, validate_rules,
    },
    fixtures::{CatalogFixture, ChannelFixture, FixtureError, ProductFixture},
    markups::{MARKUP_METADATA_KEY, MAX_MARKUP_PERCENT, MarkupError, MarkupPercent},
    periods::{Period, PeriodError},
    pricing::{
        BatchItem, DEFAULT_CURRENCY, PriceCalculation, PriceQuery, PricingError, compose,
        evaluate_batch, evaluate_price, find_currency,
    },
    schedules::{CronSchedule, EVERY_MINUTE, ScheduleError},
};
