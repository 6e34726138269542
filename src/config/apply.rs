use crate::args::{
    Command, CommonArgs, PositiveU64, PositiveUsize, parse_duration_arg, parse_header,
};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Fills every option the command line left unset from the config file.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(command: &mut Command, config: &ConfigFile) -> AppResult<()> {
    match command {
        Command::Run(args) => {
            apply_common(&mut args.common, config)?;
            if args.postfile.is_none() && args.putfile.is_none() {
                args.postfile.clone_from(&config.postfile);
                args.putfile.clone_from(&config.putfile);
            }
        }
        Command::RunFile(args) => {
            apply_common(&mut args.common, config)?;
            if args.file.is_none() {
                args.file.clone_from(&config.file);
            }
        }
    }
    Ok(())
}

fn apply_common(args: &mut CommonArgs, config: &ConfigFile) -> AppResult<()> {
    if args.url.is_none() {
        args.url.clone_from(&config.url);
    }

    if args.concurrency.is_none()
        && let Some(value) = config.concurrency
    {
        args.concurrency = Some(ensure_positive_usize(value, "concurrency")?);
    }

    if args.requests.is_none()
        && let Some(value) = config.requests
    {
        args.requests = Some(ensure_positive_u64(value, "requests")?);
    }

    if args.duration.is_none()
        && let Some(value) = config.duration.as_ref()
    {
        let text = match value {
            DurationValue::Seconds(seconds) => seconds.to_string(),
            DurationValue::Text(text) => text.clone(),
        };
        let duration = parse_duration_arg(&text)
            .map_err(|source| AppError::config(ConfigError::InvalidDuration { source }))?;
        args.duration = Some(duration);
    }

    if args.timeout.is_none()
        && let Some(value) = config.timeout
    {
        args.timeout = Some(ensure_positive_u64(value, "timeout")?);
    }

    if args.header.is_none()
        && let Some(header) = config.header.as_deref()
    {
        let parsed = parse_header(header)
            .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?;
        args.header = Some(parsed);
    }

    if args.prompushgwurl.is_none() {
        args.prompushgwurl.clone_from(&config.prompushgwurl);
    }

    if !args.json_metrics
        && let Some(value) = config.json_metrics
    {
        args.json_metrics = value;
    }

    if args.json_metrics_file.is_none() {
        args.json_metrics_file.clone_from(&config.json_metrics_file);
    }

    if !args.disable_keep_alive
        && let Some(value) = config.disable_keep_alive
    {
        args.disable_keep_alive = value;
    }

    Ok(())
}

fn ensure_positive_u64(value: u64, field: &'static str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}
