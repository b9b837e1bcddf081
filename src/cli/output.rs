//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// Result of one simulated recovery attempt, for display
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub device: String,
    pub hw_version: String,
    pub handler: Option<String>,
    pub method: String,
    pub outcome: String,
    pub result_code: i32,
    pub final_state: String,
    pub coredump_bytes: Option<usize>,
}

impl TableDisplay for AttemptReport {
    fn to_table(&self) -> String {
        let mut out = format!("Device:        {} (rev {})\n", self.device, self.hw_version);
        out.push_str(&format!(
            "Handler:       {}\n",
            self.handler.as_deref().unwrap_or("none")
        ));
        out.push_str(&format!("Method:        {}\n", self.method));
        out.push_str(&format!(
            "Outcome:       {} (code {})\n",
            self.outcome, self.result_code
        ));
        out.push_str(&format!("Final state:   {}\n", self.final_state));
        match self.coredump_bytes {
            Some(bytes) => out.push_str(&format!("Coredump:      {} bytes", bytes)),
            None => out.push_str("Coredump:      not captured"),
        }
        out
    }

    fn to_compact(&self) -> String {
        format!(
            "{}:{}:{}",
            self.device, self.outcome, self.result_code
        )
    }
}
