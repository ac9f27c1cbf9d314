use serde_json::Value;

use super::cell;

/// Fields printed by `--output minimal`, most important first.
const PRIORITY_KEYS: [&str; 6] = [
    "roi_pct",
    "base_roi_pct",
    "valid",
    "probability_positive_roi",
    "npv",
    "total_cost",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .filter(|r| r.is_object())
        .unwrap_or(value);

    for source in [result_obj, value] {
        if let Value::Object(map) = source {
            for key in PRIORITY_KEYS {
                match map.get(key) {
                    // Distributions report their mean.
                    Some(Value::Object(dist)) => {
                        if let Some(mean) = dist.get("mean") {
                            println!("{}", cell(mean));
                            return;
                        }
                    }
                    Some(val) if !val.is_null() => {
                        println!("{}", cell(val));
                        return;
                    }
                    _ => {}
                }
            }
        }
    }

    match result_obj {
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, cell(val));
            }
        }
        Value::Array(items) => println!("{} entries", items.len()),
        other => println!("{}", cell(other)),
    }
}
