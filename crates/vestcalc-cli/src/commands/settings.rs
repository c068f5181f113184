use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::commands::Context;

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the stored share price and tax rate
    Show,
    /// Change the share price and/or tax rate
    Set {
        /// Current share price
        #[arg(long)]
        price: Option<Decimal>,

        /// Tax rate as a percentage (0-100)
        #[arg(long)]
        tax_rate: Option<Decimal>,
    },
}

pub fn run(ctx: &Context, cmd: SettingsCommand) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = ctx.open_store();
    match cmd {
        SettingsCommand::Show => Ok(serde_json::to_value(store.settings())?),
        SettingsCommand::Set { price, tax_rate } => {
            if price.is_none() && tax_rate.is_none() {
                return Err("Nothing to change: pass --price and/or --tax-rate".into());
            }
            let mut settings = store.settings().clone();
            if let Some(p) = price {
                settings.current_stock_price = p;
            }
            if let Some(t) = tax_rate {
                settings.tax_rate = t;
            }
            store.update_settings(settings)?;
            store.flush()?;
            Ok(serde_json::to_value(store.settings())?)
        }
    }
}
