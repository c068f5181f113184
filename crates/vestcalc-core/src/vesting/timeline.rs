use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::date_math::{add_months, months_between};
use crate::grant::Grant;
use crate::vesting::schedule::vested_quantity;

/// A single release of units on the vesting calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingEvent {
    pub date: NaiveDate,
    /// Whole months since the grant date.
    pub months_elapsed: i32,
    /// Units vested once this event has passed.
    pub vested_cumulative: u64,
    /// Units released by this event alone.
    pub vested_increment: u64,
}

/// Release calendar implied by the cliff and the vesting frequency.
///
/// The first event falls on the cliff month (or one step after the grant
/// date when there is no cliff), then one per frequency step, and the last
/// on the month the grant is fully vested. Steps that would release nothing
/// after flooring are omitted, so increments always sum to `num_options`.
pub fn vesting_timeline(grant: &Grant) -> Vec<VestingEvent> {
    let cliff_month = ceil_months(grant.cliff_months());
    let full_month = ceil_months(grant.vesting_months()).max(cliff_month);
    let step = grant.vesting_frequency.months() as i32;

    let mut months = Vec::new();
    let mut m = if cliff_month > 0 { cliff_month } else { step };
    while m < full_month {
        months.push(m);
        m += step;
    }
    months.push(full_month);

    let mut events = Vec::with_capacity(months.len());
    let mut previous = 0u64;
    for months_elapsed in months {
        let Some(date) = add_months(grant.grant_date, months_elapsed) else {
            break;
        };
        let cumulative = vested_quantity(grant, date);
        if cumulative > previous {
            events.push(VestingEvent {
                date,
                months_elapsed,
                vested_cumulative: cumulative,
                vested_increment: cumulative - previous,
            });
            previous = cumulative;
        }
    }
    events
}

/// First release strictly after the vesting month containing `as_of`.
pub fn next_vest_event(grant: &Grant, as_of: NaiveDate) -> Option<VestingEvent> {
    let elapsed = months_between(grant.grant_date, as_of);
    vesting_timeline(grant)
        .into_iter()
        .find(|e| e.months_elapsed > elapsed)
}

fn ceil_months(months: Decimal) -> i32 {
    months.ceil().to_i32().unwrap_or(i32::MAX).max(0)
}
