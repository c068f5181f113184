use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::VestCalcError;
use crate::grant::{Grant, VestingFrequency};
use crate::types::{Money, Years};
use crate::vesting::vested_quantity;
use crate::VestCalcResult;

/// One exported grant. Field names are the spreadsheet column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Grant Name")]
    pub name: String,
    #[serde(rename = "Number of Options")]
    pub num_options: u64,
    #[serde(rename = "Strike Price")]
    pub strike_price: Money,
    #[serde(rename = "Grant Date")]
    pub grant_date: NaiveDate,
    #[serde(rename = "Vesting Period (years)")]
    pub vesting_period: Years,
    #[serde(rename = "Cliff Period (years)")]
    pub cliff_period: Years,
    #[serde(rename = "Vesting Frequency")]
    pub vesting_frequency: VestingFrequency,
    #[serde(rename = "Vested Options")]
    pub vested: u64,
    #[serde(rename = "Unvested Options")]
    pub unvested: u64,
}

pub const EXPORT_HEADERS: [&str; 9] = [
    "Grant Name",
    "Number of Options",
    "Strike Price",
    "Grant Date",
    "Vesting Period (years)",
    "Cliff Period (years)",
    "Vesting Frequency",
    "Vested Options",
    "Unvested Options",
];

/// Rows in portfolio order, vested as of `as_of`.
pub fn export_rows(grants: &[Grant], as_of: NaiveDate) -> Vec<ExportRow> {
    grants
        .iter()
        .map(|g| {
            let vested = vested_quantity(g, as_of);
            ExportRow {
                name: g.name.clone(),
                num_options: g.num_options,
                strike_price: g.strike_price,
                grant_date: g.grant_date,
                vesting_period: g.vesting_period,
                cliff_period: g.cliff_period,
                vesting_frequency: g.vesting_frequency,
                vested,
                unvested: g.num_options - vested,
            }
        })
        .collect()
}

/// Write rows as CSV. The header row is written even when there are no rows.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> VestCalcResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(EXPORT_HEADERS).map_err(csv_error)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Convenience wrapper returning the CSV document as a string.
pub fn export_csv(grants: &[Grant], as_of: NaiveDate) -> VestCalcResult<String> {
    let mut buf = Vec::new();
    write_csv(&export_rows(grants, as_of), &mut buf)?;
    String::from_utf8(buf).map_err(|e| VestCalcError::SerializationError(e.to_string()))
}

fn csv_error(e: csv::Error) -> VestCalcError {
    VestCalcError::SerializationError(e.to_string())
}
