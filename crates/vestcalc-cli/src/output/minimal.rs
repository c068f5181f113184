use serde_json::Value;

use super::{format_scalar, result_of};

/// Headline figure for each command, searched in order. Dotted paths reach
/// into nested objects.
const PRIORITY_PATHS: [&str; 9] = [
    "snapshot.combined_value",
    "total_after_tax",
    "after_tax_gain",
    "net_value",
    "vested",
    "total_vested",
    "updated",
    "deleted",
    "id",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    for path in PRIORITY_PATHS {
        if let Some(v) = lookup(result, path).filter(|v| !v.is_null()) {
            println!("{}", format_scalar(v));
            return;
        }
    }

    match result {
        Value::Array(rows) => println!("{}", rows.len()),
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_scalar(val));
            }
        }
        other => println!("{}", format_scalar(other)),
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}
