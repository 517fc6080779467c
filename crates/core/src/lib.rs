//! Tariff
//!
//! Tariff composes final catalog prices from per-channel markups and per-product scheduled
//! discounts. Discount rules are selected by cron schedule and validity period, then applied
//! with a capped percentage on top of the channel markup, using exact decimal arithmetic.

pub mod discounts;
pub mod fixtures;
pub mod markups;
pub mod numbers;
pub mod periods;
pub mod prelude;
pub mod pricing;
pub mod schedules;
