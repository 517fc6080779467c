//! Integration tests for price composition with scheduled discounts.

use jiff::Timestamp;
use rust_decimal::Decimal;
use testresult::TestResult;

use tariff::{
    discounts::{DiscountRule, select_active_discount},
    markups::MarkupPercent,
    periods::Period,
    pricing::{PriceQuery, compose, evaluate_price},
};

fn year_2025() -> Period {
    Period {
        datetime_start: Some("01-01-2025T00:00:00Z".to_string()),
        datetime_end: Some("31-12-2025T23:59:59Z".to_string()),
    }
}

fn mid_june() -> Result<Timestamp, jiff::Error> {
    "2025-06-15T12:00:00Z".parse()
}

#[test]
fn markup_without_discount() -> TestResult {
    let markup = MarkupPercent::new(Decimal::new(15, 0))?;

    let price = compose(Decimal::new(10_000, 2), markup, None)?;

    assert_eq!(price.to_string(), "115.00");

    Ok(())
}

#[test]
fn surcharge_under_cap() -> TestResult {
    let rules = [DiscountRule::new(Decimal::new(15, 0), Decimal::new(150, 0))];
    let query = PriceQuery::new(
        "UHJvZHVjdDox",
        "Q2hhbm5lbDox",
        Decimal::new(10_000, 2),
        MarkupPercent::ZERO,
    );

    let calculation = evaluate_price(&query, &rules, mid_june()?)?;

    assert!(calculation.discount_applied);
    assert_eq!(calculation.final_price.to_string(), "115.00");

    Ok(())
}

#[test]
fn surcharge_clamped_to_cap() -> TestResult {
    let rule = DiscountRule::new(Decimal::new(50, 0), Decimal::new(200, 0));

    let price = compose(Decimal::new(100_000, 2), MarkupPercent::ZERO, Some(&rule))?;

    assert_eq!(price.to_string(), "200.00");

    Ok(())
}

#[test]
fn reduction_above_floor() -> TestResult {
    let rule = DiscountRule::new(Decimal::new(-10, 0), Decimal::new(80, 0));

    let price = compose(Decimal::new(10_000, 2), MarkupPercent::ZERO, Some(&rule))?;

    assert_eq!(price.to_string(), "90.00");

    Ok(())
}

#[test]
fn rule_inside_period_is_active() -> TestResult {
    let rules =
        [DiscountRule::new(Decimal::new(15, 0), Decimal::new(150, 0)).with_period(year_2025())];

    assert_eq!(select_active_discount(&rules, mid_june()?), rules.first());

    Ok(())
}

#[test]
fn no_rules_falls_back_to_markup() -> TestResult {
    let markup = MarkupPercent::new(Decimal::new(10, 0))?;
    let query = PriceQuery::new("p", "c", Decimal::new(10_000, 2), markup);

    let calculation = evaluate_price(&query, &[], mid_june()?)?;

    assert!(!calculation.discount_applied);
    assert_eq!(calculation.active_discount, None);
    assert_eq!(calculation.final_price, compose(Decimal::new(10_000, 2), markup, None)?);

    Ok(())
}

#[test]
fn cap_holds_for_large_prices() -> TestResult {
    let rule = DiscountRule::new(Decimal::new(5, 0), Decimal::new(1_000, 0));
    let markup = MarkupPercent::new(Decimal::new(1_000, 0))?;
    let cap = Decimal::new(1_000, 0);

    for base in [1_i64, 99, 1_000, 123_456, 98_765_432] {
        let price = compose(Decimal::new(base, 0), markup, Some(&rule))?;

        assert!(price <= cap, "{price} exceeds cap for base {base}");
    }

    Ok(())
}

#[test]
fn floor_holds_for_small_prices() -> TestResult {
    let rule = DiscountRule::new(Decimal::new(-90, 0), Decimal::new(25, 0));
    let floor = Decimal::new(25, 0);

    for base in [1_i64, 10, 100, 249, 10_000] {
        let price = compose(Decimal::new(base, 0), MarkupPercent::ZERO, Some(&rule))?;

        assert!(price >= floor, "{price} below floor for base {base}");
    }

    Ok(())
}

#[test]
fn overlapping_rules_pick_the_first() -> TestResult {
    let rules = [
        DiscountRule::new(Decimal::new(-5, 0), Decimal::ZERO).with_period(year_2025()),
        DiscountRule::new(Decimal::new(-20, 0), Decimal::ZERO),
    ];

    let selected = select_active_discount(&rules, mid_june()?).ok_or("no active rule")?;

    assert_eq!(selected.percent, Decimal::new(-5, 0));

    Ok(())
}

#[test]
fn composition_is_repeatable() -> TestResult {
    let markup = MarkupPercent::new(Decimal::new(3_333, 2))?;
    let base = Decimal::new(1_999, 2);

    assert_eq!(compose(base, markup, None)?, compose(base, markup, None)?);

    Ok(())
}

#[test]
fn weekday_business_hours_schedule() -> TestResult {
    let rules = [DiscountRule::new(Decimal::new(-10, 0), Decimal::new(80, 0))
        .with_schedule("0 9-17 * * 1-5")
        .with_period(year_2025())];

    // Monday 2025-06-16 at 10:00 is a firing minute, 10:30 is not.
    assert!(select_active_discount(&rules, "2025-06-16T10:00:00Z".parse()?).is_some());
    assert!(select_active_discount(&rules, "2025-06-16T10:30:00Z".parse()?).is_none());

    Ok(())
}
