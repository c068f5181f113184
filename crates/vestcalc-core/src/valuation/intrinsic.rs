use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::grant::{validate_price, validate_tax_rate, Grant};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::vesting::{unvested_quantity, vested_quantity};
use crate::VestCalcResult;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Per-unit gain at `market_price`, floored at zero: an underwater option
/// is simply not exercised.
pub fn intrinsic_value_per_unit(market_price: Money, strike_price: Money) -> Money {
    (market_price - strike_price).max(Decimal::ZERO)
}

/// Saturates instead of overflowing; validated inputs never come close.
pub fn position_value(quantity: u64, market_price: Money, strike_price: Money) -> Money {
    Decimal::from(quantity).saturating_mul(intrinsic_value_per_unit(market_price, strike_price))
}

/// Value left after tax. `tax_rate` is a percentage in [0, 100]; callers
/// validate it with [`validate_tax_rate`].
pub fn after_tax_value(value: Money, tax_rate: Percent) -> Money {
    value * (Decimal::ONE - tax_rate / dec!(100))
}

/// Vested units of one grant valued at a hypothetical price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitScenarioValue {
    pub vested: u64,
    pub value: Money,
    pub after_tax: Money,
}

/// Value of a grant's vested units if the company exits at `exit_price`,
/// independent of the live market price setting.
pub fn exit_scenario_value(
    grant: &Grant,
    as_of: NaiveDate,
    exit_price: Money,
    tax_rate: Percent,
) -> ExitScenarioValue {
    let vested = vested_quantity(grant, as_of);
    let value = position_value(vested, exit_price, grant.strike_price);
    ExitScenarioValue {
        vested,
        value,
        after_tax: after_tax_value(value, tax_rate),
    }
}

// ---------------------------------------------------------------------------
// Portfolio exit scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitScenarioInput {
    pub grants: Vec<Grant>,
    pub as_of: NaiveDate,
    pub exit_price: Money,
    /// Percentage, 0-100.
    pub tax_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantExitValue {
    pub id: String,
    pub name: String,
    pub vested: u64,
    pub value: Money,
    pub after_tax: Money,
    /// Value of the units that have not vested by `as_of`.
    pub unvested_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitScenarioOutput {
    pub exit_price: Money,
    pub grants: Vec<GrantExitValue>,
    pub total_vested: u64,
    pub total_value: Money,
    pub total_tax: Money,
    pub total_after_tax: Money,
    pub total_unvested_value: Money,
}

/// Value every grant's vested units at a hypothetical exit price and sum
/// the per-grant results.
pub fn exit_scenario(
    input: &ExitScenarioInput,
) -> VestCalcResult<ComputationOutput<ExitScenarioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_price("exit_price", input.exit_price)?;
    validate_tax_rate(input.tax_rate)?;
    for g in &input.grants {
        g.validate()?;
    }
    if input.grants.is_empty() {
        warnings.push("No grants supplied; all totals are zero".into());
    }

    let mut rows = Vec::with_capacity(input.grants.len());
    let mut total_vested = 0u64;
    let mut total_value = Decimal::ZERO;
    let mut total_after_tax = Decimal::ZERO;
    let mut total_unvested_value = Decimal::ZERO;

    for g in &input.grants {
        let ev = exit_scenario_value(g, input.as_of, input.exit_price, input.tax_rate);
        let unvested_value = position_value(
            unvested_quantity(g, input.as_of),
            input.exit_price,
            g.strike_price,
        );
        if input.exit_price < g.strike_price {
            warnings.push(format!(
                "'{}' is underwater at {} (strike {})",
                g.name, input.exit_price, g.strike_price
            ));
        }

        total_vested = total_vested.saturating_add(ev.vested);
        total_value = total_value.saturating_add(ev.value);
        total_after_tax = total_after_tax.saturating_add(ev.after_tax);
        total_unvested_value = total_unvested_value.saturating_add(unvested_value);

        rows.push(GrantExitValue {
            id: g.id.clone(),
            name: g.name.clone(),
            vested: ev.vested,
            value: ev.value,
            after_tax: ev.after_tax,
            unvested_value,
        });
    }

    let output = ExitScenarioOutput {
        exit_price: input.exit_price,
        grants: rows,
        total_vested,
        total_value,
        total_tax: total_value - total_after_tax,
        total_after_tax,
        total_unvested_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Exit scenario: vested units x max(0, exit price - strike), summed per grant",
        &serde_json::json!({
            "as_of": input.as_of.to_string(),
            "exit_price": input.exit_price.to_string(),
            "tax_rate_pct": input.tax_rate.to_string(),
            "num_grants": input.grants.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
