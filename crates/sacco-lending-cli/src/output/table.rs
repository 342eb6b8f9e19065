use serde_json::{Map, Value};
use std::io::Write;
use tabled::{builder::Builder, Table};

type TableResult = Result<(), Box<dyn std::error::Error>>;

/// Format output as tables using the tabled crate. Scalar result fields go in
/// a Field/Value table; lists of records (schedule rows, eligibility checks)
/// each get a table of their own.
pub fn write_table<W: Write>(out: &mut W, value: &Value) -> TableResult {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_result(out, result, map),
            _ => write_fields(out, map),
        },
        Value::Array(arr) => write_records(out, arr),
        _ => {
            writeln!(out, "{}", value)?;
            Ok(())
        }
    }
}

fn write_result<W: Write>(
    out: &mut W,
    result: &Map<String, Value>,
    envelope: &Map<String, Value>,
) -> TableResult {
    write_fields(out, result)?;

    for (key, val) in result {
        if let Value::Array(rows) = val {
            if is_record_list(rows) {
                writeln!(out, "\n{}:", key)?;
                write_records(out, rows)?;
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            writeln!(out, "\nWarnings:")?;
            for w in warnings.iter().filter_map(Value::as_str) {
                writeln!(out, "  - {}", w)?;
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        writeln!(out, "\nMethodology: {}", meth)?;
    }
    Ok(())
}

fn write_fields<W: Write>(out: &mut W, map: &Map<String, Value>) -> TableResult {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if matches!(val, Value::Array(rows) if is_record_list(rows)) {
            continue;
        }
        builder.push_record([key.as_str(), &cell(val)]);
    }
    writeln!(out, "{}", Table::from(builder))?;
    Ok(())
}

fn write_records<W: Write>(out: &mut W, rows: &[Value]) -> TableResult {
    let Some(Value::Object(first)) = rows.first() else {
        if rows.is_empty() {
            writeln!(out, "(empty)")?;
        }
        for item in rows {
            writeln!(out, "{}", cell(item))?;
        }
        return Ok(());
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    writeln!(out, "{}", Table::from(builder))?;
    Ok(())
}

fn is_record_list(rows: &[Value]) -> bool {
    matches!(rows.first(), Some(Value::Object(_)))
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(cell).collect::<Vec<_>>().join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
