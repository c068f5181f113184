use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::grant::{validate_price, validate_tax_rate, validate_units};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::valuation::intrinsic::{after_tax_value, position_value};
use crate::VestCalcResult;

// ---------------------------------------------------------------------------
// Stock options
// ---------------------------------------------------------------------------

/// Input for a quick stock-option exercise estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionValueInput {
    pub num_options: u64,
    pub strike_price: Money,
    pub current_price: Money,
    /// Percentage, 0-100.
    pub tax_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionValueOutput {
    /// Cash needed to exercise every option.
    pub exercise_cost: Money,
    /// Market value of the shares received.
    pub gross_value: Money,
    /// gross_value - exercise_cost, floored at zero.
    pub intrinsic_gain: Money,
    pub tax: Money,
    pub after_tax_gain: Money,
    /// gross_value / exercise_cost; absent when exercise is free.
    pub return_multiple: Option<Decimal>,
    /// Share price at which exercising breaks even.
    pub breakeven_price: Money,
    pub underwater: bool,
}

/// Estimate the gain from exercising and selling a block of options.
pub fn option_value(
    input: &OptionValueInput,
) -> VestCalcResult<ComputationOutput<OptionValueOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_units("num_options", input.num_options)?;
    validate_price("strike_price", input.strike_price)?;
    validate_price("current_price", input.current_price)?;
    validate_tax_rate(input.tax_rate)?;

    let units = Decimal::from(input.num_options);
    let exercise_cost = units * input.strike_price;
    let gross_value = units * input.current_price;
    let intrinsic_gain = position_value(input.num_options, input.current_price, input.strike_price);
    let after_tax_gain = after_tax_value(intrinsic_gain, input.tax_rate);

    let return_multiple = if exercise_cost.is_zero() {
        None
    } else {
        Some((gross_value / exercise_cost).round_dp(4))
    };

    let underwater = input.current_price < input.strike_price;
    if underwater {
        warnings.push(format!(
            "Options are underwater: share price {} is below strike {}",
            input.current_price, input.strike_price
        ));
    }

    let output = OptionValueOutput {
        exercise_cost,
        gross_value,
        intrinsic_gain,
        tax: intrinsic_gain - after_tax_gain,
        after_tax_gain,
        return_multiple,
        breakeven_price: input.strike_price,
        underwater,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Option exercise: units x max(0, price - strike), taxed at a flat rate",
        &serde_json::json!({
            "num_options": input.num_options,
            "tax_rate_pct": input.tax_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// RSUs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsuValueInput {
    pub num_units: u64,
    pub share_price: Money,
    /// Percentage, 0-100.
    pub tax_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsuValueOutput {
    pub gross_value: Money,
    pub tax_withheld: Money,
    pub net_value: Money,
    /// Whole shares sold to cover withholding.
    pub shares_withheld: u64,
    pub net_shares: u64,
}

/// Value of RSUs on release. RSUs carry no strike, so the whole share
/// price is taxable income.
pub fn rsu_value(input: &RsuValueInput) -> VestCalcResult<ComputationOutput<RsuValueOutput>> {
    let start = Instant::now();

    validate_units("num_units", input.num_units)?;
    validate_price("share_price", input.share_price)?;
    validate_tax_rate(input.tax_rate)?;

    let gross_value = position_value(input.num_units, input.share_price, Decimal::ZERO);
    let net_value = after_tax_value(gross_value, input.tax_rate);

    let withheld = (Decimal::from(input.num_units) * input.tax_rate / dec!(100)).ceil();
    let shares_withheld = withheld
        .to_u64()
        .unwrap_or(input.num_units)
        .min(input.num_units);

    let output = RsuValueOutput {
        gross_value,
        tax_withheld: gross_value - net_value,
        net_value,
        shares_withheld,
        net_shares: input.num_units - shares_withheld,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "RSU release: units x share price, flat withholding, sell-to-cover rounded up",
        &serde_json::json!({
            "num_units": input.num_units,
            "tax_rate_pct": input.tax_rate.to_string(),
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_value_in_the_money() {
        let input = OptionValueInput {
            num_options: 1000,
            strike_price: dec!(10),
            current_price: dec!(50),
            tax_rate: dec!(30),
        };
        let out = option_value(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.exercise_cost, dec!(10000));
        assert_eq!(r.gross_value, dec!(50000));
        assert_eq!(r.intrinsic_gain, dec!(40000));
        assert_eq!(r.after_tax_gain, dec!(28000));
        assert_eq!(r.tax, dec!(12000));
        assert_eq!(r.return_multiple, Some(dec!(5)));
        assert!(!r.underwater);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_option_value_underwater() {
        let input = OptionValueInput {
            num_options: 1000,
            strike_price: dec!(20),
            current_price: dec!(15),
            tax_rate: dec!(30),
        };
        let out = option_value(&input).unwrap();
        assert_eq!(out.result.intrinsic_gain, Decimal::ZERO);
        assert!(out.result.underwater);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_option_value_free_exercise_has_no_multiple() {
        let input = OptionValueInput {
            num_options: 10,
            strike_price: Decimal::ZERO,
            current_price: dec!(5),
            tax_rate: Decimal::ZERO,
        };
        let out = option_value(&input).unwrap();
        assert_eq!(out.result.return_multiple, None);
        assert_eq!(out.result.after_tax_gain, dec!(50));
    }

    #[test]
    fn test_option_value_rejects_bad_tax_rate() {
        let input = OptionValueInput {
            num_options: 10,
            strike_price: dec!(1),
            current_price: dec!(5),
            tax_rate: dec!(-5),
        };
        assert!(option_value(&input).is_err());
    }

    #[test]
    fn test_rsu_value() {
        let input = RsuValueInput {
            num_units: 1000,
            share_price: dec!(50),
            tax_rate: dec!(30),
        };
        let r = rsu_value(&input).unwrap().result;
        assert_eq!(r.gross_value, dec!(50000));
        assert_eq!(r.tax_withheld, dec!(15000));
        assert_eq!(r.net_value, dec!(35000));
        assert_eq!(r.shares_withheld, 300);
        assert_eq!(r.net_shares, 700);
    }

    #[test]
    fn test_rsu_withholding_rounds_up() {
        let input = RsuValueInput {
            num_units: 10,
            share_price: dec!(100),
            tax_rate: dec!(33),
        };
        let r = rsu_value(&input).unwrap().result;
        assert_eq!(r.shares_withheld, 4);
        assert_eq!(r.net_shares, 6);
    }

    #[test]
    fn test_calculators_reject_out_of_range_inputs() {
        let options = OptionValueInput {
            num_options: u64::MAX,
            strike_price: dec!(1),
            current_price: dec!(10000000000),
            tax_rate: dec!(30),
        };
        assert!(option_value(&options).is_err());

        let rsus = RsuValueInput {
            num_units: 100,
            share_price: dec!(10000000000000),
            tax_rate: dec!(30),
        };
        assert!(rsu_value(&rsus).is_err());
    }
}
