//! Discount Models

use serde::Serialize;
use tariff::discounts::DiscountRule;

/// Product with its rules and the rule active at the time of reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDiscounts {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub discounts: Vec<DiscountRule>,
    pub active_discount: Option<DiscountRule>,
}

/// Outcome of applying one rule list to many products
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscountsSummary {
    pub total_products: usize,
    pub updated_products: usize,
    pub discounts_count: usize,
}
