pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;
use std::io::{self, Write};

type OutputResult = Result<(), Box<dyn std::error::Error>>;

/// Render `value` to stdout in the requested format. Write failures (closed
/// pipe, full disk) are returned so the process can exit non-zero.
pub fn format_output(format: &OutputFormat, value: &Value) -> OutputResult {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_output(&mut out, format, value)?;
    out.flush()?;
    Ok(())
}

/// Render `value` into any writer.
pub fn write_output<W: Write>(out: &mut W, format: &OutputFormat, value: &Value) -> OutputResult {
    match format {
        OutputFormat::Json => json::write_json(out, value),
        OutputFormat::Table => table::write_table(out, value),
        OutputFormat::Csv => csv_out::write_csv(out, value),
        OutputFormat::Minimal => minimal::write_minimal(out, value),
    }
}
