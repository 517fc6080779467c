//! Discount Evaluation

use jiff::Timestamp;
use tracing::{debug, warn};

use crate::{discounts::DiscountRule, schedules::CronSchedule};

impl DiscountRule {
    /// Whether the rule applies at `now`.
    ///
    /// The period is checked first. A schedule that cannot be parsed, or that never fires, does
    /// not restrict the rule.
    #[must_use]
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        if let Some(period) = &self.period
            && !period.contains(now)
        {
            return false;
        }

        self.schedule_due(now)
    }

    fn schedule_due(&self, now: Timestamp) -> bool {
        let due = CronSchedule::parse(&self.schedule).and_then(|schedule| schedule.is_due(now));

        match due {
            Ok(due) => due,
            Err(error) => {
                warn!(
                    schedule = %self.schedule,
                    %error,
                    "unusable discount schedule; treating rule as active"
                );

                true
            }
        }
    }
}

/// First rule in list order that is active at `now`.
#[must_use]
pub fn select_active_discount(rules: &[DiscountRule], now: Timestamp) -> Option<&DiscountRule> {
    let active = rules.iter().find(|rule| rule.is_active_at(now));

    debug!(
        rules = rules.len(),
        active = active.is_some(),
        "evaluated discount rules"
    );

    active
}
