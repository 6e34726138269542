use std::time::Duration;

use tracing::info;
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, SinkError};
use crate::metrics::{PhaseStats, ResultMetrics};

use super::format::write_line;

/// Job label under which every run is pushed.
const PUSH_JOB: &str = "loadphase";
const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Renders the metrics in the Prometheus text exposition format.
///
/// # Errors
///
/// Returns an error when writing into the buffer fails.
pub fn render_prometheus(metrics: &ResultMetrics) -> AppResult<String> {
    let mut output = String::new();

    write_phase(
        &mut output,
        "loadphase_tcp_connect_ms",
        "TCP connect time in milliseconds.",
        &metrics.tcp_connect,
    )?;
    write_phase(
        &mut output,
        "loadphase_server_processing_ms",
        "Server processing time in milliseconds.",
        &metrics.server_processing,
    )?;
    write_phase(
        &mut output,
        "loadphase_content_transfer_ms",
        "Content transfer time in milliseconds.",
        &metrics.content_transfer,
    )?;
    write_phase(
        &mut output,
        "loadphase_total_ms",
        "Whole-request time in milliseconds.",
        &metrics.total_time,
    )?;

    write_gauge(
        &mut output,
        "loadphase_dns_median_ms",
        "Median DNS lookup time in milliseconds.",
        &metrics.dns_median.to_string(),
    )?;
    write_gauge(
        &mut output,
        "loadphase_requests_total",
        "Total number of requests.",
        &metrics.total_requests.to_string(),
    )?;
    write_gauge(
        &mut output,
        "loadphase_requests_failed_total",
        "Failed requests.",
        &metrics.failed_requests.to_string(),
    )?;
    write_gauge(
        &mut output,
        "loadphase_requests_timeout_total",
        "Timed-out requests.",
        &metrics.timed_out_requests.to_string(),
    )?;
    write_gauge(
        &mut output,
        "loadphase_requests_per_second",
        "Average requests per second.",
        &metrics.requests_per_second.to_string(),
    )?;
    write_gauge(
        &mut output,
        "loadphase_response_bytes_total",
        "Response body bytes read.",
        &metrics.response_bytes.to_string(),
    )?;

    if !metrics.status_codes.is_empty() {
        write_line(
            &mut output,
            "# HELP loadphase_responses_total Completed responses by status code.",
        )?;
        write_line(&mut output, "# TYPE loadphase_responses_total gauge")?;
        for (code, count) in &metrics.status_codes {
            write_line(
                &mut output,
                &format!("loadphase_responses_total{{code=\"{}\"}} {}", code, count),
            )?;
        }
    }

    Ok(output)
}

fn write_phase(
    output: &mut String,
    name: &str,
    help: &str,
    stats: &PhaseStats,
) -> AppResult<()> {
    write_line(output, &format!("# HELP {} {}", name, help))?;
    write_line(output, &format!("# TYPE {} gauge", name))?;
    for (stat, value) in [
        ("mean", stats.mean),
        ("median", stats.median),
        ("p95", stats.p95),
    ] {
        write_line(output, &format!("{}{{stat=\"{}\"}} {}", name, stat, value))?;
    }
    Ok(())
}

fn write_gauge(output: &mut String, name: &str, help: &str, value: &str) -> AppResult<()> {
    write_line(output, &format!("# HELP {} {}", name, help))?;
    write_line(output, &format!("# TYPE {} gauge", name))?;
    write_line(output, &format!("{} {}", name, value))
}

/// The push endpoint for `gateway`, i.e. `{gateway}/metrics/job/loadphase`.
///
/// # Errors
///
/// Returns an error when `gateway` is not a valid URL.
pub fn push_url(gateway: &str) -> AppResult<Url> {
    let trimmed = gateway.trim().trim_end_matches('/');
    Url::parse(&format!("{}/metrics/job/{}", trimmed, PUSH_JOB)).map_err(|err| {
        AppError::sink(SinkError::InvalidGatewayUrl {
            url: gateway.to_owned(),
            source: err,
        })
    })
}

/// Replaces the job's metric group on a Prometheus push gateway.
///
/// # Errors
///
/// Returns an error when the request fails or the gateway rejects it.
pub async fn push_metrics(gateway: &str, metrics: &ResultMetrics) -> AppResult<()> {
    let url = push_url(gateway)?;
    let body = render_prometheus(metrics)?;
    let push_error = |err: reqwest::Error| {
        AppError::sink(SinkError::PushGateway {
            url: url.to_string(),
            source: err,
        })
    };
    let client = reqwest::Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(PUSH_TIMEOUT)
        .build()
        .map_err(push_error)?;
    let response = client
        .put(url.clone())
        .header(reqwest::header::CONTENT_TYPE, "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await
        .map_err(push_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::sink(SinkError::PushGatewayStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }));
    }
    info!("Metrics pushed to {}", url);
    Ok(())
}
