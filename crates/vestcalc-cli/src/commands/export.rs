use clap::Args;
use colored::Colorize;
use serde_json::{json, Value};
use std::fs::File;
use std::io;

use vestcalc_core::export::{export_rows, write_csv};

use crate::commands::Context;

/// Arguments for CSV export
#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<String>,
}

/// Arguments for clearing the store
#[derive(Args)]
pub struct ClearArgs {
    /// Confirm that every grant and setting should be deleted
    #[arg(long)]
    pub yes: bool,
}

/// CSV goes straight to the destination regardless of `--output`.
pub fn run_export(ctx: &Context, args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store();
    let rows = export_rows(store.grants(), ctx.as_of);
    if rows.is_empty() {
        eprintln!("{}: No grants to export", "warning".yellow().bold());
    }

    match args.out {
        Some(path) => {
            let file = File::create(&path)
                .map_err(|e| format!("Failed to create '{}': {}", path, e))?;
            write_csv(&rows, file)?;
            Ok(json!({ "path": path, "rows": rows.len(), "as_of": ctx.as_of }))
        }
        None => {
            write_csv(&rows, io::stdout().lock())?;
            Ok(Value::Null)
        }
    }
}

pub fn run_clear(ctx: &Context, args: ClearArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if !args.yes {
        return Err("This deletes every grant and setting and cannot be undone; re-run with --yes".into());
    }
    let mut store = ctx.open_store();
    let removed = store.grants().len();
    store.clear_all()?;
    Ok(json!({ "cleared": true, "grants_removed": removed }))
}
