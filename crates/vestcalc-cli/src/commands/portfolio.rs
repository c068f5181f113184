use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use vestcalc_core::portfolio::aggregate::{self, PortfolioInput};
use vestcalc_core::valuation::intrinsic::{self, ExitScenarioInput};
use vestcalc_core::valuation::what_if::{self, WhatIfInput};

use crate::commands::Context;

/// Arguments for the portfolio summary
#[derive(Args)]
pub struct SummaryArgs {
    /// Override the stored share price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Override the stored tax rate (percentage)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

/// Arguments for an exit scenario
#[derive(Args)]
pub struct ExitArgs {
    /// Hypothetical price per share at exit
    #[arg(long)]
    pub price: Decimal,

    /// Tax rate (percentage); defaults to the stored setting
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

/// Arguments for a what-if price sweep
#[derive(Args)]
pub struct WhatIfArgs {
    /// Comma-separated prices (e.g. "10,25,50,100")
    #[arg(long, value_delimiter = ',', required = true)]
    pub prices: Vec<Decimal>,

    /// Tax rate (percentage); defaults to the stored setting
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

pub fn run_summary(ctx: &Context, args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store();
    let mut settings = store.settings().clone();
    if let Some(p) = args.price {
        settings.current_stock_price = p;
    }
    if let Some(t) = args.tax_rate {
        settings.tax_rate = t;
    }
    let input = PortfolioInput {
        grants: store.grants().to_vec(),
        as_of: ctx.as_of,
        settings,
    };
    let result = aggregate::analyze_portfolio(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_exit(ctx: &Context, args: ExitArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store();
    let input = ExitScenarioInput {
        grants: store.grants().to_vec(),
        as_of: ctx.as_of,
        exit_price: args.price,
        tax_rate: args.tax_rate.unwrap_or(store.settings().tax_rate),
    };
    let result = intrinsic::exit_scenario(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_what_if(ctx: &Context, args: WhatIfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store();
    let input = WhatIfInput {
        grants: store.grants().to_vec(),
        as_of: ctx.as_of,
        prices: args.prices,
        tax_rate: args.tax_rate.unwrap_or(store.settings().tax_rate),
    };
    let result = what_if::what_if_prices(&input)?;
    Ok(serde_json::to_value(result)?)
}
