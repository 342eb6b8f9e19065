use log::debug;
use serde_json::Value;
use std::io::{self, Read};

/// JSON piped on stdin, or None when stdin is a terminal or the pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    read_piped(io::stdin().lock())
}

fn read_piped<R: Read>(mut reader: R) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let mut buffer = String::new();
    let bytes = reader.read_to_string(&mut buffer)?;
    debug!("read {} byte(s) from stdin", bytes);

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse JSON from stdin: {}", e))?;
    Ok(Some(value))
}
