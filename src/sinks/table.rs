use std::io::IsTerminal;

use crossterm::style::Stylize;

use crate::error::AppResult;
use crate::metrics::{PhaseStats, ResultMetrics};

use super::format::{format_ms, write_line};

/// Prints the summary table to stdout; values are cyan on a color terminal.
///
/// # Errors
///
/// Returns an error when the table cannot be rendered.
pub fn print_summary(metrics: &ResultMetrics, no_color: bool) -> AppResult<()> {
    let use_color = !no_color && std::io::stdout().is_terminal();
    print!("{}", render_summary(metrics, use_color)?);
    Ok(())
}

/// Renders the summary table.
///
/// # Errors
///
/// Returns an error when writing into the buffer fails.
pub fn render_summary(metrics: &ResultMetrics, use_color: bool) -> AppResult<String> {
    let paint = |value: String| {
        if use_color {
            value.cyan().to_string()
        } else {
            value
        }
    };
    let phase_line = |label: &str, stats: &PhaseStats| {
        format!(
            " {:<22} {} {} {}",
            label,
            paint(format!("{:>10}", format_ms(stats.mean))),
            paint(format!("{:>10}", format_ms(stats.median))),
            paint(format!("{:>10}", format_ms(stats.p95))),
        )
    };

    let mut output = String::new();
    write_line(&mut output, "")?;
    write_line(
        &mut output,
        &format!(" {:<22} {:>10} {:>10} {:>10}", "", "Mean", "Median", "95%"),
    )?;
    write_line(
        &mut output,
        &phase_line("TCP Connect (ms)", &metrics.tcp_connect),
    )?;
    write_line(
        &mut output,
        &phase_line("Server Processing (ms)", &metrics.server_processing),
    )?;
    write_line(
        &mut output,
        &phase_line("Content Transfer (ms)", &metrics.content_transfer),
    )?;
    write_line(&mut output, &phase_line("Total (ms)", &metrics.total_time))?;
    write_line(&mut output, "")?;
    write_line(
        &mut output,
        &format!(
            " Summary: Total Req.: {}  Failed Req.: {}  Timed Out: {}",
            paint(metrics.total_requests.to_string()),
            paint(metrics.failed_requests.to_string()),
            paint(metrics.timed_out_requests.to_string()),
        ),
    )?;
    write_line(
        &mut output,
        &format!(
            " DNS Lookup (median, ms): {}  Req./s: {}  Elapsed (ms): {}  Bytes: {}",
            paint(format_ms(metrics.dns_median)),
            paint(format_ms(metrics.requests_per_second)),
            paint(metrics.elapsed_ms.to_string()),
            paint(metrics.response_bytes.to_string()),
        ),
    )?;
    if !metrics.status_codes.is_empty() {
        let codes = metrics
            .status_codes
            .iter()
            .map(|(code, count)| format!("{}: {}", code, paint(count.to_string())))
            .collect::<Vec<String>>()
            .join("  ");
        write_line(&mut output, &format!(" Status codes: {}", codes))?;
    }
    write_line(&mut output, "")?;
    Ok(output)
}
