use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use vestcalc_core::portfolio::grant_breakdown;
use vestcalc_core::{GrantInput, VestingFrequency};

use crate::commands::Context;
use crate::input;

#[derive(Subcommand)]
pub enum GrantCommand {
    /// Add a grant
    Add(GrantFields),
    /// Replace a grant's fields; omitted flags keep their current values
    Update {
        /// Id of the grant to replace
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: GrantFields,
    },
    /// Remove a grant
    Delete {
        #[arg(long)]
        id: String,
    },
    /// List grants with vested/unvested counts
    List,
    /// Show one stored grant
    Show {
        #[arg(long)]
        id: String,
    },
}

/// Grant field flags. With `--input`, fields come from a JSON file (or
/// piped stdin) and flags override them.
#[derive(Args)]
pub struct GrantFields {
    /// Path to a JSON grant record
    #[arg(long)]
    pub input: Option<String>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Units granted
    #[arg(long)]
    pub num_options: Option<u64>,

    /// Exercise price per unit (0 for RSUs)
    #[arg(long)]
    pub strike_price: Option<Decimal>,

    /// Vesting start date (YYYY-MM-DD)
    #[arg(long)]
    pub grant_date: Option<NaiveDate>,

    /// Vesting period in years
    #[arg(long)]
    pub vesting_period: Option<Decimal>,

    /// Cliff in years
    #[arg(long)]
    pub cliff_period: Option<Decimal>,

    /// Vesting frequency: monthly, quarterly, annually
    #[arg(long)]
    pub frequency: Option<VestingFrequency>,
}

impl GrantFields {
    /// Apply flags over `base`.
    fn merge_into(self, mut base: GrantInput) -> GrantInput {
        if let Some(v) = self.name {
            base.name = v;
        }
        if let Some(v) = self.num_options {
            base.num_options = v;
        }
        if let Some(v) = self.strike_price {
            base.strike_price = v;
        }
        if let Some(v) = self.grant_date {
            base.grant_date = v;
        }
        if let Some(v) = self.vesting_period {
            base.vesting_period = v;
        }
        if let Some(v) = self.cliff_period {
            base.cliff_period = v;
        }
        if let Some(v) = self.frequency {
            base.vesting_frequency = v;
        }
        base
    }
}

/// Starting point for a new grant when no input file is given: the usual
/// four-year schedule with a one-year cliff, starting on the reference date.
fn new_grant_template(as_of: NaiveDate) -> GrantInput {
    GrantInput {
        name: String::new(),
        num_options: 0,
        strike_price: Decimal::ZERO,
        grant_date: as_of,
        vesting_period: Decimal::from(4),
        cliff_period: Decimal::ONE,
        vesting_frequency: VestingFrequency::Monthly,
    }
}

pub fn run(ctx: &Context, cmd: GrantCommand) -> Result<Value, Box<dyn std::error::Error>> {
    match cmd {
        GrantCommand::Add(fields) => run_add(ctx, fields),
        GrantCommand::Update { id, fields } => run_update(ctx, &id, fields),
        GrantCommand::Delete { id } => run_delete(ctx, &id),
        GrantCommand::List => run_list(ctx),
        GrantCommand::Show { id } => run_show(ctx, &id),
    }
}

fn run_add(ctx: &Context, fields: GrantFields) -> Result<Value, Box<dyn std::error::Error>> {
    let base = match input::read_grant_input(fields.input.as_deref())? {
        Some(g) => g,
        None => new_grant_template(ctx.as_of),
    };
    let candidate = fields.merge_into(base);
    if candidate.num_options == 0 {
        return Err("--num-options (or an input record) is required to add a grant".into());
    }

    let mut store = ctx.open_store();
    let grant = store.add_grant(candidate)?;
    store.flush()?;
    Ok(serde_json::to_value(grant)?)
}

fn run_update(
    ctx: &Context,
    id: &str,
    fields: GrantFields,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = ctx.open_store();
    let Some(existing) = store.grant(id).cloned() else {
        return Ok(json!({ "id": id, "updated": false }));
    };

    let base = match input::read_grant_input(fields.input.as_deref())? {
        Some(g) => g,
        None => GrantInput::from(existing),
    };
    let replacement = fields.merge_into(base);
    let updated = store.update_grant(id, replacement)?;
    store.flush()?;
    Ok(json!({ "id": id, "updated": updated, "grant": store.grant(id) }))
}

fn run_delete(ctx: &Context, id: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = ctx.open_store();
    let deleted = store.delete_grant(id);
    store.flush()?;
    Ok(json!({ "id": id, "deleted": deleted }))
}

fn run_list(ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store();
    let rows = grant_breakdown(
        store.grants(),
        ctx.as_of,
        store.settings().current_stock_price,
    );
    Ok(serde_json::to_value(rows)?)
}

fn run_show(ctx: &Context, id: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store();
    match store.grant(id) {
        Some(g) => Ok(serde_json::to_value(g)?),
        None => Err(format!("No grant with id '{id}'").into()),
    }
}
