use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::grant::{Grant, PortfolioSettings};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::valuation::intrinsic::{after_tax_value, position_value};
use crate::vesting::{vested_pct, vested_quantity};
use crate::VestCalcResult;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Portfolio-level totals. Derived on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub total_grants: usize,
    pub total_options: u64,
    pub total_vested: u64,
    pub total_unvested: u64,
    pub vested_pct: Percent,
    /// Strike weighted by units granted; zero for an empty portfolio.
    pub avg_strike: Money,
    /// total_vested x max(0, price - avg_strike).
    pub combined_value: Money,
    /// Sum of each grant's own vested intrinsic value.
    pub per_grant_value: Money,
}

/// Fold every grant into portfolio totals as of `as_of`.
///
/// `combined_value` values the total vested quantity against the
/// unit-weighted average strike. Grants struck above the market price pull
/// that figure away from `per_grant_value`, which is reported alongside it.
pub fn summarize(grants: &[Grant], as_of: NaiveDate, market_price: Money) -> PortfolioSnapshot {
    if grants.is_empty() {
        return PortfolioSnapshot::default();
    }

    let mut total_options = 0u64;
    let mut total_vested = 0u64;
    let mut weighted_strike = Decimal::ZERO;
    let mut per_grant_value = Decimal::ZERO;

    for g in grants {
        let vested = vested_quantity(g, as_of);
        total_options = total_options.saturating_add(g.num_options);
        total_vested = total_vested.saturating_add(vested);
        weighted_strike =
            weighted_strike.saturating_add(g.strike_price.saturating_mul(Decimal::from(g.num_options)));
        per_grant_value =
            per_grant_value.saturating_add(position_value(vested, market_price, g.strike_price));
    }

    let avg_strike = if total_options == 0 {
        Decimal::ZERO
    } else {
        weighted_strike / Decimal::from(total_options)
    };

    PortfolioSnapshot {
        total_grants: grants.len(),
        total_options,
        total_vested,
        total_unvested: total_options.saturating_sub(total_vested),
        vested_pct: vested_pct(total_vested, total_options),
        avg_strike,
        combined_value: position_value(total_vested, market_price, avg_strike),
        per_grant_value,
    }
}

// ---------------------------------------------------------------------------
// Per-grant breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantPosition {
    pub id: String,
    pub name: String,
    pub num_options: u64,
    pub strike_price: Money,
    pub vested: u64,
    pub unvested: u64,
    pub vested_pct: Percent,
    /// Intrinsic value of the vested units.
    pub value: Money,
}

/// One row per grant, in portfolio order.
pub fn grant_breakdown(grants: &[Grant], as_of: NaiveDate, market_price: Money) -> Vec<GrantPosition> {
    grants
        .iter()
        .map(|g| {
            let vested = vested_quantity(g, as_of);
            GrantPosition {
                id: g.id.clone(),
                name: g.name.clone(),
                num_options: g.num_options,
                strike_price: g.strike_price,
                vested,
                unvested: g.num_options - vested,
                vested_pct: vested_pct(vested, g.num_options),
                value: position_value(vested, market_price, g.strike_price),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub grants: Vec<Grant>,
    pub as_of: NaiveDate,
    #[serde(default)]
    pub settings: PortfolioSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub snapshot: PortfolioSnapshot,
    pub positions: Vec<GrantPosition>,
    pub combined_after_tax: Money,
    pub per_grant_after_tax: Money,
}

/// Snapshot plus per-grant rows at the configured market price and tax rate.
pub fn analyze_portfolio(
    input: &PortfolioInput,
) -> VestCalcResult<ComputationOutput<PortfolioAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.settings.validate()?;
    for g in &input.grants {
        g.validate()?;
    }

    let price = input.settings.current_stock_price;
    let snapshot = summarize(&input.grants, input.as_of, price);
    let positions = grant_breakdown(&input.grants, input.as_of, price);

    if input.grants.is_empty() {
        warnings.push("Portfolio is empty".into());
    }
    if snapshot.combined_value != snapshot.per_grant_value {
        warnings.push(format!(
            "Average-strike value {} differs from per-grant value {}",
            snapshot.combined_value.round_dp(2),
            snapshot.per_grant_value.round_dp(2)
        ));
    }

    let output = PortfolioAnalysis {
        combined_after_tax: after_tax_value(snapshot.combined_value, input.settings.tax_rate),
        per_grant_after_tax: after_tax_value(snapshot.per_grant_value, input.settings.tax_rate),
        snapshot,
        positions,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio aggregate: total vested units x max(0, price - unit-weighted average strike)",
        &serde_json::json!({
            "as_of": input.as_of.to_string(),
            "market_price": price.to_string(),
            "tax_rate_pct": input.settings.tax_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::VestingFrequency;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn grant(id: &str, units: u64, strike: Decimal) -> Grant {
        Grant {
            id: id.into(),
            name: id.to_uppercase(),
            num_options: units,
            strike_price: strike,
            grant_date: d(2018, 1, 1),
            vesting_period: dec!(4),
            cliff_period: dec!(1),
            vesting_frequency: VestingFrequency::Monthly,
        }
    }

    #[test]
    fn test_empty_portfolio_is_all_zero() {
        let s = summarize(&[], d(2024, 1, 1), dec!(50));
        assert_eq!(s, PortfolioSnapshot::default());
        assert_eq!(s.avg_strike, Decimal::ZERO);
        assert_eq!(s.combined_value, Decimal::ZERO);
    }

    #[test]
    fn test_weighted_average_strike() {
        let grants = vec![grant("a", 1000, dec!(5)), grant("b", 2000, dec!(20))];
        let s = summarize(&grants, d(2024, 1, 1), dec!(25));
        assert_eq!(s.total_grants, 2);
        assert_eq!(s.total_options, 3000);
        assert_eq!(s.total_vested, 3000);
        assert_eq!(s.avg_strike, dec!(15));
        assert_eq!(s.combined_value, dec!(30000));
        assert_eq!(s.per_grant_value, dec!(30000));
        assert_eq!(s.vested_pct, dec!(100.0));
    }

    #[test]
    fn test_average_strike_differs_from_per_grant_sum() {
        // b is underwater at 15, but the average strike (15) hides that
        let grants = vec![grant("a", 1000, dec!(5)), grant("b", 2000, dec!(20))];
        let s = summarize(&grants, d(2024, 1, 1), dec!(15));
        assert_eq!(s.combined_value, Decimal::ZERO);
        assert_eq!(s.per_grant_value, dec!(10000));
    }

    #[test]
    fn test_zero_unit_grants_do_not_divide_by_zero() {
        let grants = vec![grant("a", 0, dec!(5))];
        let s = summarize(&grants, d(2024, 1, 1), dec!(25));
        assert_eq!(s.total_grants, 1);
        assert_eq!(s.avg_strike, Decimal::ZERO);
        assert_eq!(s.vested_pct, Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_rows() {
        let grants = vec![grant("a", 4800, dec!(10))];
        let rows = grant_breakdown(&grants, d(2020, 1, 1), dec!(50));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vested, 2400);
        assert_eq!(rows[0].unvested, 2400);
        assert_eq!(rows[0].vested_pct, dec!(50.0));
        assert_eq!(rows[0].value, dec!(96000));
    }

    #[test]
    fn test_analyze_portfolio_after_tax() {
        let input = PortfolioInput {
            grants: vec![grant("a", 1000, dec!(5)), grant("b", 2000, dec!(20))],
            as_of: d(2024, 1, 1),
            settings: PortfolioSettings {
                current_stock_price: dec!(25),
                tax_rate: dec!(30),
            },
        };
        let out = analyze_portfolio(&input).unwrap();
        assert_eq!(out.result.combined_after_tax, dec!(21000));
        assert_eq!(out.result.positions.len(), 2);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_analyze_portfolio_warns_on_method_gap() {
        let input = PortfolioInput {
            grants: vec![grant("a", 1000, dec!(5)), grant("b", 2000, dec!(20))],
            as_of: d(2024, 1, 1),
            settings: PortfolioSettings {
                current_stock_price: dec!(15),
                tax_rate: dec!(30),
            },
        };
        let out = analyze_portfolio(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_summarize_saturates_on_oversized_grants() {
        let one = vec![grant("big", u64::MAX, dec!(10000000000))];
        let s = summarize(&one, d(2024, 1, 1), dec!(20000000000));
        assert_eq!(s.total_options, u64::MAX);
        assert_eq!(s.combined_value, Decimal::MAX);

        let half = u64::MAX / 2 + 1;
        let two = vec![grant("a", half, dec!(1)), grant("b", half, dec!(1))];
        let s = summarize(&two, d(2024, 1, 1), dec!(2));
        assert_eq!(s.total_options, u64::MAX);
        assert_eq!(s.total_unvested, 0);
    }

    #[test]
    fn test_analyze_portfolio_rejects_oversized_grant() {
        let input = PortfolioInput {
            grants: vec![grant("big", u64::MAX, dec!(1))],
            as_of: d(2024, 1, 1),
            settings: PortfolioSettings::default(),
        };
        assert!(analyze_portfolio(&input).is_err());
    }
}
