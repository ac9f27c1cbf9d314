use serde_json::Value;
use std::io;

use super::{cell, flatten};

/// Write output as CSV to stdout.
///
/// Results with monthly cash flows or row arrays are written one row per
/// entry; anything else becomes a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);
    let rows = result
        .get("cash_flows")
        .or_else(|| value.get("results"))
        .and_then(Value::as_array);

    match (rows, result) {
        (Some(rows), _) => write_rows(&mut wtr, rows),
        (None, Value::Object(map)) => {
            let (scalars, _) = flatten(map);
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in &scalars {
                let _ = wtr.write_record([key.as_str(), &cell(val)]);
            }
        }
        (None, Value::Array(arr)) => write_rows(&mut wtr, arr),
        (None, other) => {
            let _ = wtr.write_record([&cell(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            let _ = wtr.write_record([&cell(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
