//! Result rendering: column-aligned table or JSON array.
//!
//! The formatters consume finished records; nothing here feeds back into
//! the scan.

pub mod json;
pub mod table;

use crate::system::HandleRecord;

/// How the result list is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Table,
    Json,
}

/// Render records in the requested mode.
pub fn render(records: &[HandleRecord], mode: OutputMode) -> Result<String, serde_json::Error> {
    match mode {
        OutputMode::Table => Ok(table::format_table(records)),
        OutputMode::Json => json::format_json(records),
    }
}
