use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VestCalcError;
use crate::types::{Money, Percent, Years};
use crate::VestCalcResult;

/// Longest accepted vesting schedule.
pub const MAX_VESTING_YEARS: Decimal = dec!(100);

/// Largest unit count accepted for a grant or calculator input.
pub const MAX_UNITS: u64 = 1_000_000_000_000;

/// Largest strike or share price accepted. Together with [`MAX_UNITS`] this
/// keeps every position value well inside `Decimal`'s range.
pub const MAX_PRICE: Decimal = dec!(1000000000000);

// ---------------------------------------------------------------------------
// Vesting frequency
// ---------------------------------------------------------------------------

/// Cadence at which vested units are released.
///
/// Frequency only changes where the vesting steps fall on the calendar; the
/// fraction vested on a given date is the same for every cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VestingFrequency {
    #[default]
    Monthly,
    Quarterly,
    #[serde(alias = "annual", alias = "yearly")]
    Annually,
}

impl VestingFrequency {
    /// Length of one vesting step in months.
    pub fn months(self) -> u32 {
        match self {
            VestingFrequency::Monthly => 1,
            VestingFrequency::Quarterly => 3,
            VestingFrequency::Annually => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VestingFrequency::Monthly => "monthly",
            VestingFrequency::Quarterly => "quarterly",
            VestingFrequency::Annually => "annually",
        }
    }
}

impl fmt::Display for VestingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VestingFrequency {
    type Err = VestCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(VestingFrequency::Monthly),
            "quarterly" => Ok(VestingFrequency::Quarterly),
            "annually" | "annual" | "yearly" => Ok(VestingFrequency::Annually),
            other => Err(VestCalcError::invalid(
                "vesting_frequency",
                format!("Unknown vesting frequency '{other}' (expected monthly, quarterly or annually)"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Grant
// ---------------------------------------------------------------------------

/// One equity award held in the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// Opaque identifier, assigned by the store and never changed.
    /// Empty for ad-hoc records that were never stored.
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Total granted units.
    pub num_options: u64,
    /// Exercise price per unit; zero for RSUs.
    pub strike_price: Money,
    /// Vesting clock start.
    pub grant_date: NaiveDate,
    /// Total vesting duration in years.
    pub vesting_period: Years,
    /// Years before which nothing vests.
    pub cliff_period: Years,
    #[serde(default)]
    pub vesting_frequency: VestingFrequency,
}

/// Field values for a grant that has not been assigned an id yet.
///
/// Used both for creation and for full-record replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantInput {
    pub name: String,
    pub num_options: u64,
    pub strike_price: Money,
    pub grant_date: NaiveDate,
    pub vesting_period: Years,
    pub cliff_period: Years,
    #[serde(default)]
    pub vesting_frequency: VestingFrequency,
}

impl GrantInput {
    /// Check the record before it reaches the vesting or valuation math.
    pub fn validate(&self) -> VestCalcResult<()> {
        validate_schedule(
            self.num_options,
            self.strike_price,
            self.vesting_period,
            self.cliff_period,
        )
    }

    /// Attach an id, producing a stored record.
    pub fn into_grant(self, id: impl Into<String>) -> Grant {
        Grant {
            id: id.into(),
            name: self.name,
            num_options: self.num_options,
            strike_price: self.strike_price,
            grant_date: self.grant_date,
            vesting_period: self.vesting_period,
            cliff_period: self.cliff_period,
            vesting_frequency: self.vesting_frequency,
        }
    }
}

impl Grant {
    pub fn validate(&self) -> VestCalcResult<()> {
        validate_schedule(
            self.num_options,
            self.strike_price,
            self.vesting_period,
            self.cliff_period,
        )
    }

    /// Vesting duration in months (may be fractional, e.g. 2.5 years = 30).
    pub fn vesting_months(&self) -> Decimal {
        self.vesting_period * dec!(12)
    }

    /// Cliff duration in months.
    pub fn cliff_months(&self) -> Decimal {
        self.cliff_period * dec!(12)
    }
}

impl From<Grant> for GrantInput {
    fn from(g: Grant) -> Self {
        GrantInput {
            name: g.name,
            num_options: g.num_options,
            strike_price: g.strike_price,
            grant_date: g.grant_date,
            vesting_period: g.vesting_period,
            cliff_period: g.cliff_period,
            vesting_frequency: g.vesting_frequency,
        }
    }
}

fn validate_schedule(
    num_options: u64,
    strike_price: Money,
    vesting_period: Years,
    cliff_period: Years,
) -> VestCalcResult<()> {
    validate_units("num_options", num_options)?;
    validate_price("strike_price", strike_price)?;
    if vesting_period <= Decimal::ZERO {
        return Err(VestCalcError::invalid(
            "vesting_period",
            "Vesting period must be greater than zero",
        ));
    }
    if vesting_period > MAX_VESTING_YEARS {
        return Err(VestCalcError::invalid(
            "vesting_period",
            format!("Vesting period cannot exceed {MAX_VESTING_YEARS} years"),
        ));
    }
    if cliff_period < Decimal::ZERO {
        return Err(VestCalcError::invalid(
            "cliff_period",
            "Cliff period cannot be negative",
        ));
    }
    if cliff_period > vesting_period {
        return Err(VestCalcError::invalid(
            "cliff_period",
            format!("Cliff period ({cliff_period}y) cannot exceed vesting period ({vesting_period}y)"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Market price and tax assumptions applied to every valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSettings {
    pub current_stock_price: Money,
    /// Percentage, 0-100.
    pub tax_rate: Percent,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        PortfolioSettings {
            current_stock_price: dec!(50),
            tax_rate: dec!(30),
        }
    }
}

impl PortfolioSettings {
    pub fn validate(&self) -> VestCalcResult<()> {
        validate_price("current_stock_price", self.current_stock_price)?;
        validate_tax_rate(self.tax_rate)
    }
}

/// Prices must lie in [0, MAX_PRICE].
pub fn validate_price(field: &str, price: Money) -> VestCalcResult<()> {
    if price < Decimal::ZERO {
        return Err(VestCalcError::invalid(field, "Price cannot be negative"));
    }
    if price > MAX_PRICE {
        return Err(VestCalcError::invalid(
            field,
            format!("Price cannot exceed {MAX_PRICE} (got {price})"),
        ));
    }
    Ok(())
}

pub fn validate_units(field: &str, units: u64) -> VestCalcResult<()> {
    if units > MAX_UNITS {
        return Err(VestCalcError::invalid(
            field,
            format!("Unit count cannot exceed {MAX_UNITS} (got {units})"),
        ));
    }
    Ok(())
}

/// Tax rates are percentages and must lie in [0, 100].
pub fn validate_tax_rate(tax_rate: Percent) -> VestCalcResult<()> {
    if tax_rate < Decimal::ZERO || tax_rate > dec!(100) {
        return Err(VestCalcError::invalid(
            "tax_rate",
            format!("Tax rate must be between 0 and 100 (got {tax_rate})"),
        ));
    }
    Ok(())
}
