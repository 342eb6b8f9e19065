use serde_json::{Map, Value};
use std::io::Write;

type CsvResult = Result<(), Box<dyn std::error::Error>>;

/// Write output as CSV. A result carrying a `schedule` becomes one row per
/// installment; any other result becomes `field,value` pairs.
pub fn write_csv<W: Write>(out: &mut W, value: &Value) -> CsvResult {
    let mut wtr = csv::Writer::from_writer(out);

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match result.get("schedule") {
                Some(Value::Array(rows)) => write_rows(&mut wtr, rows)?,
                _ => write_pairs(&mut wtr, result)?,
            },
            _ => write_pairs(&mut wtr, map)?,
        },
        Value::Array(arr) => write_rows(&mut wtr, arr)?,
        _ => wtr.write_record([cell(value)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_pairs<W: Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> CsvResult {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &cell(val)])?;
    }
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> CsvResult {
    let headers: Vec<&str> = match rows.first() {
        Some(Value::Object(first)) => first.keys().map(|k| k.as_str()).collect(),
        Some(_) => {
            for item in rows {
                wtr.write_record([cell(item)])?;
            }
            return Ok(());
        }
        None => return Ok(()),
    };

    wtr.write_record(&headers)?;
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
