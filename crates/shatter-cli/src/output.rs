//! Output helpers shared by the CLI commands.

use serde::Serialize;

use crate::OutputFormat;

/// Print a serializable value as JSON when JSON output was requested.
pub fn print_json<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) -> bool {
    match format {
        OutputFormat::Json => {
            if !quiet {
                match serde_json::to_string_pretty(value) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("failed to serialize output: {}", e),
                }
            }
            true
        }
        OutputFormat::Text => false,
    }
}
