//! Tariff application services: catalog access, channel markups, product discounts, price
//! calculation and catalog webhooks.

pub mod catalog;
pub mod config;
pub mod context;
pub mod discounts;
pub mod markups;
pub mod observability;
pub mod prices;
pub mod webhooks;
