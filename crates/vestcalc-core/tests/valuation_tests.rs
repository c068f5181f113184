use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use vestcalc_core::valuation::calculators::{option_value, rsu_value, OptionValueInput, RsuValueInput};
use vestcalc_core::valuation::intrinsic::{exit_scenario, ExitScenarioInput};
use vestcalc_core::valuation::what_if::{what_if_prices, WhatIfInput};
use vestcalc_core::valuation::{
    after_tax_value, exit_scenario_value, intrinsic_value_per_unit, position_value,
    validate_tax_rate,
};
use vestcalc_core::{Grant, VestingFrequency};

fn grant(units: u64, strike: Decimal) -> Grant {
    Grant {
        id: "v".into(),
        name: "Valuation grant".into(),
        num_options: units,
        strike_price: strike,
        grant_date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        vesting_period: dec!(4),
        cliff_period: dec!(1),
        vesting_frequency: VestingFrequency::Monthly,
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

#[test]
fn test_rsu_has_full_price_as_intrinsic_value() {
    assert_eq!(intrinsic_value_per_unit(dec!(42.10), Decimal::ZERO), dec!(42.10));
}

#[test]
fn test_after_tax_on_position() {
    let value = position_value(3000, dec!(25), dec!(15));
    assert_eq!(value, dec!(30000));
    assert_eq!(after_tax_value(value, dec!(30)), dec!(21000));
}

#[test]
fn test_tax_rate_bounds() {
    assert!(validate_tax_rate(Decimal::ZERO).is_ok());
    assert!(validate_tax_rate(dec!(100)).is_ok());
    assert!(validate_tax_rate(dec!(100.01)).is_err());
    assert!(validate_tax_rate(dec!(-0.01)).is_err());
}

#[test]
fn test_exit_scenario_ignores_live_price() {
    let g = grant(4800, dec!(10));
    let as_of = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let low = exit_scenario_value(&g, as_of, dec!(12), dec!(0));
    let high = exit_scenario_value(&g, as_of, dec!(100), dec!(0));
    assert_eq!(low.vested, high.vested);
    assert_eq!(low.value, dec!(4800));
    assert_eq!(high.value, dec!(216000));
}

proptest! {
    #[test]
    fn prop_intrinsic_value_never_negative(price in 0u32..100_000, strike in 0u32..100_000) {
        let v = intrinsic_value_per_unit(Decimal::new(price.into(), 2), Decimal::new(strike.into(), 2));
        prop_assert!(v >= Decimal::ZERO);
    }

    #[test]
    fn prop_after_tax_never_exceeds_value(value in 0u32..10_000_000, rate in 0u32..=100) {
        let v = Decimal::from(value);
        let after = after_tax_value(v, Decimal::from(rate));
        prop_assert!(after <= v);
        prop_assert!(after >= Decimal::ZERO);
    }
}

// ---------------------------------------------------------------------------
// Analyses
// ---------------------------------------------------------------------------

#[test]
fn test_exit_scenario_envelope() {
    let input = ExitScenarioInput {
        grants: vec![grant(4800, dec!(10))],
        as_of: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        exit_price: dec!(20),
        tax_rate: dec!(25),
    };
    let out = exit_scenario(&input).unwrap();
    assert_eq!(out.result.total_value, dec!(24000));
    assert_eq!(out.result.total_after_tax, dec!(18000));
    assert!(out.methodology.contains("Exit scenario"));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}

#[test]
fn test_what_if_is_monotonic_in_price() {
    let input = WhatIfInput {
        grants: vec![grant(4800, dec!(10)), grant(1000, dec!(30))],
        as_of: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        prices: (0..10).map(|p| Decimal::from(p * 10)).collect(),
        tax_rate: dec!(30),
    };
    let points = what_if_prices(&input).unwrap().result.points;
    assert!(points.windows(2).all(|w| w[0].vested_value <= w[1].vested_value));
    assert!(points.iter().all(|p| p.vested_value <= p.fully_vested_value));
}

#[test]
fn test_option_and_rsu_calculators_agree_at_zero_strike() {
    let opt = option_value(&OptionValueInput {
        num_options: 500,
        strike_price: Decimal::ZERO,
        current_price: dec!(40),
        tax_rate: dec!(30),
    })
    .unwrap()
    .result;
    let rsu = rsu_value(&RsuValueInput {
        num_units: 500,
        share_price: dec!(40),
        tax_rate: dec!(30),
    })
    .unwrap()
    .result;
    assert_eq!(opt.after_tax_gain, rsu.net_value);
    assert_eq!(opt.tax, rsu.tax_withheld);
}
