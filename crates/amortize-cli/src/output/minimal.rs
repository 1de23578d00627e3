use serde_json::Value;

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

/// Heuristic: a schedule collapses to its total interest cost; a tagged
/// resolution prints the field it solved; anything else walks a priority
/// list of well-known result fields and falls back to the first field.
fn headline(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(total) = result
        .get("aggregate")
        .and_then(|a| a.get("total_interest"))
    {
        return format_minimal(total);
    }

    if let Value::Object(map) = result {
        // The resolve command tags which field it solved
        if let Some(Value::String(solved)) = map.get("solved_for") {
            if let Some(val) = map.get(solved.as_str()) {
                return format_minimal(val);
            }
        }

        for key in ["payment", "term_months", "principal", "monthly_rate"] {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
