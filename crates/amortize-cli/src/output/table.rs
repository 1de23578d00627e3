use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Column order for the amortization schedule table.
const SCHEDULE_COLUMNS: [&str; 6] = [
    "month",
    "payment_total",
    "principal_portion",
    "interest_portion",
    "insurance_premium",
    "remaining_balance",
];

/// Format output as a table using the tabled crate.
///
/// A schedule envelope (result carrying a "lines" array) renders as a
/// month-by-month table followed by the aggregate totals; anything else
/// renders as a flat field/value table.
pub fn print_table(value: &Value) {
    let envelope = value.as_object();
    let result = envelope.and_then(|m| m.get("result")).unwrap_or(value);

    if let Some(lines) = result.get("lines").and_then(Value::as_array) {
        print_schedule_table(lines);
        if let Some(aggregate) = result.get("aggregate") {
            println!();
            print_flat_object(aggregate);
        }
    } else {
        print_flat_object(result);
    }

    if let Some(map) = envelope {
        if let Some(Value::Array(warnings)) = map.get("warnings") {
            if !warnings.is_empty() {
                println!("\nWarnings:");
                for w in warnings {
                    if let Value::String(s) = w {
                        println!("  - {}", s);
                    }
                }
            }
        }
        if let Some(Value::String(meth)) = map.get("methodology") {
            println!("\nMethodology: {}", meth);
        }
    }
}

fn print_schedule_table(lines: &[Value]) {
    if lines.is_empty() {
        println!("(empty schedule)");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_COLUMNS);
    for line in lines {
        if let Value::Object(map) = line {
            let row: Vec<String> = SCHEDULE_COLUMNS
                .iter()
                .map(|col| map.get(*col).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
