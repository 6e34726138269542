use std::fmt::Write as _;

use crate::error::{AppError, AppResult, SinkError};

pub(super) fn write_line(output: &mut String, line: &str) -> AppResult<()> {
    writeln!(output, "{}", line).map_err(|err| AppError::sink(SinkError::WriteLine { source: err }))
}

/// Milliseconds with two decimals, as shown in the summary table.
pub(super) fn format_ms(value: f64) -> String {
    format!("{:.2}", value)
}
