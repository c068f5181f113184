use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::VestCalcError;
use crate::grant::{validate_price, validate_tax_rate, Grant};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::valuation::intrinsic::{after_tax_value, position_value};
use crate::vesting::vested_quantity;
use crate::VestCalcResult;

/// Input for a what-if sweep over hypothetical share prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfInput {
    pub grants: Vec<Grant>,
    pub as_of: NaiveDate,
    /// Prices to evaluate, in the order they should be reported.
    pub prices: Vec<Money>,
    /// Percentage, 0-100.
    pub tax_rate: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfPoint {
    pub price: Money,
    /// Intrinsic value of vested units, summed per grant.
    pub vested_value: Money,
    pub after_tax_value: Money,
    /// Intrinsic value once every unit has vested.
    pub fully_vested_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfOutput {
    pub total_vested: u64,
    pub points: Vec<WhatIfPoint>,
}

/// Value the portfolio at each hypothetical price.
pub fn what_if_prices(input: &WhatIfInput) -> VestCalcResult<ComputationOutput<WhatIfOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.prices.is_empty() {
        return Err(VestCalcError::InvalidInput {
            field: "prices".into(),
            reason: "At least one price is required".into(),
        });
    }
    for &p in &input.prices {
        validate_price("prices", p)?;
    }
    validate_tax_rate(input.tax_rate)?;
    for g in &input.grants {
        g.validate()?;
    }
    if input.grants.is_empty() {
        warnings.push("No grants supplied; every point is zero".into());
    }

    let vested: Vec<u64> = input
        .grants
        .iter()
        .map(|g| vested_quantity(g, input.as_of))
        .collect();

    let points = input
        .prices
        .iter()
        .map(|&price| {
            let mut vested_value = Decimal::ZERO;
            let mut fully_vested_value = Decimal::ZERO;
            for (g, &units) in input.grants.iter().zip(&vested) {
                vested_value =
                    vested_value.saturating_add(position_value(units, price, g.strike_price));
                fully_vested_value = fully_vested_value
                    .saturating_add(position_value(g.num_options, price, g.strike_price));
            }
            WhatIfPoint {
                price,
                vested_value,
                after_tax_value: after_tax_value(vested_value, input.tax_rate),
                fully_vested_value,
            }
        })
        .collect();

    let output = WhatIfOutput {
        total_vested: vested.iter().fold(0u64, |acc, v| acc.saturating_add(*v)),
        points,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "What-if price sweep: per-grant intrinsic value at each hypothetical price",
        &serde_json::json!({
            "as_of": input.as_of.to_string(),
            "num_prices": input.prices.len(),
            "tax_rate_pct": input.tax_rate.to_string(),
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
    use rust_decimal_macros::dec;

    fn grant(units: u64, strike: Decimal) -> Grant {
        Grant {
            id: String::new(),
            name: "What-if".into(),
            num_options: units,
            strike_price: strike,
            grant_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            vesting_period: dec!(4),
            cliff_period: dec!(1),
            vesting_frequency: VestingFrequency::Monthly,
        }
    }

    #[test]
    fn test_price_sweep_keeps_order() {
        let input = WhatIfInput {
            grants: vec![grant(1000, dec!(5)), grant(2000, dec!(20))],
            as_of: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            prices: vec![dec!(30), dec!(10), dec!(0)],
            tax_rate: dec!(50),
        };
        let out = what_if_prices(&input).unwrap().result;
        assert_eq!(out.total_vested, 1500);
        let prices: Vec<Decimal> = out.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![dec!(30), dec!(10), dec!(0)]);

        // 500 * 25 + 1000 * 10
        assert_eq!(out.points[0].vested_value, dec!(22500));
        assert_eq!(out.points[0].after_tax_value, dec!(11250));
        assert_eq!(out.points[0].fully_vested_value, dec!(45000));
        // second grant underwater at 10
        assert_eq!(out.points[1].vested_value, dec!(2500));
        assert_eq!(out.points[2].vested_value, Decimal::ZERO);
    }

    #[test]
    fn test_empty_price_list_rejected() {
        let input = WhatIfInput {
            grants: vec![grant(1, dec!(1))],
            as_of: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            prices: vec![],
            tax_rate: dec!(30),
        };
        assert!(what_if_prices(&input).is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let input = WhatIfInput {
            grants: vec![],
            as_of: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            prices: vec![dec!(5), dec!(-5)],
            tax_rate: dec!(30),
        };
        assert!(what_if_prices(&input).is_err());
    }
}
