use clap::Args;
use serde_json::Value;

use vestcalc_core::vesting::schedule::{self, VestingScheduleInput};

use crate::commands::Context;
use crate::input;

/// Arguments for a vesting schedule
#[derive(Args)]
pub struct VestingArgs {
    /// Id of a stored grant
    #[arg(long, conflicts_with = "input")]
    pub id: Option<String>,

    /// Path to a JSON grant record (not stored)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_vesting(ctx: &Context, args: VestingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let grant = if let Some(ref id) = args.id {
        let store = ctx.open_store();
        store
            .grant(id)
            .cloned()
            .ok_or_else(|| format!("No grant with id '{id}'"))?
    } else if let Some(g) = input::read_grant_input(args.input.as_deref())? {
        g.into_grant("")
    } else {
        return Err("--id, --input <file.json> or stdin required for a vesting schedule".into());
    };

    let result = schedule::vesting_schedule(&VestingScheduleInput {
        grant,
        as_of: ctx.as_of,
    })?;
    Ok(serde_json::to_value(result)?)
}
