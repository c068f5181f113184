use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use vestcalc_core::valuation::calculators::{self, OptionValueInput, RsuValueInput};

/// Arguments for a stock-option exercise estimate
#[derive(Args)]
pub struct OptionValueArgs {
    /// Number of options
    #[arg(long)]
    pub num_options: u64,

    /// Exercise price per option
    #[arg(long)]
    pub strike_price: Decimal,

    /// Current share price
    #[arg(long)]
    pub current_price: Decimal,

    /// Tax rate as a percentage (0-100)
    #[arg(long, default_value = "30")]
    pub tax_rate: Decimal,
}

/// Arguments for an RSU release estimate
#[derive(Args)]
pub struct RsuValueArgs {
    /// Number of RSUs released
    #[arg(long)]
    pub num_units: u64,

    /// Share price at release
    #[arg(long)]
    pub share_price: Decimal,

    /// Withholding rate as a percentage (0-100)
    #[arg(long, default_value = "30")]
    pub tax_rate: Decimal,
}

pub fn run_option_value(args: OptionValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = OptionValueInput {
        num_options: args.num_options,
        strike_price: args.strike_price,
        current_price: args.current_price,
        tax_rate: args.tax_rate,
    };
    let result = calculators::option_value(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rsu_value(args: RsuValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = RsuValueInput {
        num_units: args.num_units,
        share_price: args.share_price,
        tax_rate: args.tax_rate,
    };
    let result = calculators::rsu_value(&input)?;
    Ok(serde_json::to_value(result)?)
}
