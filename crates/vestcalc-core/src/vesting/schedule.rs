use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::date_math::months_between;
use crate::grant::Grant;
use crate::types::{with_metadata, ComputationOutput, Percent};
use crate::vesting::timeline::{next_vest_event, vesting_timeline, VestingEvent};
use crate::VestCalcResult;

// ---------------------------------------------------------------------------
// Core vesting math
// ---------------------------------------------------------------------------

/// Fraction of the grant vested as of `as_of`, in [0, 1].
///
/// Zero until the cliff month is reached, then linear in whole elapsed
/// months, capped at one.
pub fn vested_fraction(grant: &Grant, as_of: NaiveDate) -> Decimal {
    let elapsed = Decimal::from(months_between(grant.grant_date, as_of));
    if elapsed < grant.cliff_months() {
        return Decimal::ZERO;
    }
    let total = grant.vesting_months();
    if total <= Decimal::ZERO || elapsed >= total {
        return Decimal::ONE;
    }
    elapsed / total
}

/// Units vested as of `as_of`. Always within [0, num_options] and
/// non-decreasing in `as_of`.
pub fn vested_quantity(grant: &Grant, as_of: NaiveDate) -> u64 {
    let elapsed = Decimal::from(months_between(grant.grant_date, as_of));
    if elapsed < grant.cliff_months() {
        return 0;
    }
    let total = grant.vesting_months();
    // A zero-length schedule never passes validation; treat it as vesting at the cliff.
    if total <= Decimal::ZERO || elapsed >= total {
        return grant.num_options;
    }
    // Multiply before dividing so thirds and twelfths floor exactly.
    let units = (Decimal::from(grant.num_options) * elapsed / total).floor();
    units.to_u64().unwrap_or(0).min(grant.num_options)
}

pub fn unvested_quantity(grant: &Grant, as_of: NaiveDate) -> u64 {
    grant.num_options.saturating_sub(vested_quantity(grant, as_of))
}

/// Vested share as a percentage rounded to one decimal place; zero for an
/// empty grant.
pub fn vested_pct(vested: u64, total: u64) -> Percent {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(vested) * dec!(100) / Decimal::from(total)).round_dp(1)
}

// ---------------------------------------------------------------------------
// Schedule analysis
// ---------------------------------------------------------------------------

/// Input for a single-grant vesting schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VestingScheduleInput {
    pub grant: Grant,
    /// Reference date for the vested/unvested split.
    pub as_of: NaiveDate,
}

/// Vesting position of one grant plus its full release calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VestingScheduleOutput {
    pub months_elapsed: i32,
    pub cliff_reached: bool,
    pub fully_vested: bool,
    pub vested: u64,
    pub unvested: u64,
    pub vested_pct: Percent,
    pub next_event: Option<VestingEvent>,
    pub timeline: Vec<VestingEvent>,
}

/// Vested/unvested split as of a date, the next release and the full
/// release calendar for one grant.
pub fn vesting_schedule(
    input: &VestingScheduleInput,
) -> VestCalcResult<ComputationOutput<VestingScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let grant = &input.grant;
    grant.validate()?;

    let months_elapsed = months_between(grant.grant_date, input.as_of);
    if months_elapsed < 0 {
        warnings.push(format!(
            "Reference date {} precedes grant date {}; nothing has vested",
            input.as_of, grant.grant_date
        ));
    }
    if grant.num_options == 0 {
        warnings.push("Grant has zero units".into());
    }

    let vested = vested_quantity(grant, input.as_of);
    let output = VestingScheduleOutput {
        months_elapsed,
        cliff_reached: Decimal::from(months_elapsed) >= grant.cliff_months(),
        fully_vested: Decimal::from(months_elapsed) >= grant.vesting_months(),
        vested,
        unvested: grant.num_options - vested,
        vested_pct: vested_pct(vested, grant.num_options),
        next_event: next_vest_event(grant, input.as_of),
        timeline: vesting_timeline(grant),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cliff + linear monthly vesting (whole calendar months)",
        &serde_json::json!({
            "as_of": input.as_of.to_string(),
            "vesting_period_years": grant.vesting_period.to_string(),
            "cliff_period_years": grant.cliff_period.to_string(),
            "vesting_frequency": grant.vesting_frequency.as_str(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
