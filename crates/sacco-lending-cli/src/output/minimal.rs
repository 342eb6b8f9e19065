use serde_json::{Map, Value};
use std::io::Write;

/// Result fields tried in order when the output is not a loan decision.
const PRIORITY_KEYS: [&str; 4] = [
    "monthly_payment",
    "max_principal",
    "requested_amount",
    "max_debt_to_income",
];

/// Write just the key answer.
///
/// Loan decisions print as `<eligible|ineligible> <amount> <rate>%`. Other
/// results print the first of [`PRIORITY_KEYS`] present, falling back to the
/// first field of the result object.
pub fn write_minimal<W: Write>(out: &mut W, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let line = match result_obj {
        Value::Object(map) => decision_line(map)
            .or_else(|| {
                PRIORITY_KEYS
                    .iter()
                    .filter_map(|key| map.get(*key))
                    .find(|val| !val.is_null())
                    .map(scalar)
            })
            .or_else(|| map.iter().next().map(|(key, val)| format!("{}: {}", key, scalar(val))))
            .unwrap_or_default(),
        other => scalar(other),
    };

    writeln!(out, "{}", line)?;
    Ok(())
}

fn decision_line(map: &Map<String, Value>) -> Option<String> {
    let eligible = map.get("is_eligible")?.as_bool()?;
    let amount = map.get("recommended_amount").map(scalar)?;
    let rate = map.get("recommended_interest_rate").map(scalar)?;
    let verdict = if eligible { "eligible" } else { "ineligible" };
    Some(format!("{} {} {}%", verdict, amount, rate))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
