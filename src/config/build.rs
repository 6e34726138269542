use std::time::Duration;

use bytes::Bytes;
use tracing::warn;

use crate::args::{Command, CommonArgs, HttpMethod, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};

use super::run::{
    RequestHeader, RunBound, RunConfig, SourceLocation, SuffixSource, TargetMode,
    validate_base_url,
};

/// Per-request timeout used when neither the CLI nor the config sets one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Turns parsed (and config-filled) arguments into an immutable run plan.
///
/// `body` is the already-loaded POST/PUT payload, if any.
///
/// # Errors
///
/// Returns a validation error when a required option is missing or invalid.
pub fn build_run_config(command: &Command, body: Option<Bytes>) -> AppResult<RunConfig> {
    let common = command.common();
    let base_url = common
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    validate_base_url(base_url)?;

    let concurrency: PositiveUsize = common
        .concurrency
        .ok_or_else(|| AppError::validation(ValidationError::MissingConcurrency))?;

    let header = common
        .header
        .as_ref()
        .map(|(name, value)| RequestHeader::parse(name, value))
        .transpose()?;

    let request_timeout = common
        .timeout
        .map_or(DEFAULT_REQUEST_TIMEOUT, |secs| Duration::from_secs(secs.get()));

    let (targets, method) = match command {
        Command::Run(args) => {
            let method = match (args.postfile.as_ref(), args.putfile.as_ref()) {
                (Some(_), Some(_)) => {
                    return Err(AppError::validation(ValidationError::PostPutConflict));
                }
                (Some(_), None) => HttpMethod::Post,
                (None, Some(_)) => HttpMethod::Put,
                (None, None) => HttpMethod::Get,
            };
            (TargetMode::Single, method)
        }
        Command::RunFile(args) => {
            let file = args
                .file
                .as_deref()
                .map(str::trim)
                .filter(|file| !file.is_empty())
                .ok_or_else(|| AppError::validation(ValidationError::MissingSuffixFile))?;
            let location = SourceLocation::parse(file)?;
            (
                TargetMode::List(SuffixSource::Location(location)),
                HttpMethod::Get,
            )
        }
    };

    let bound = resolve_bound(common, matches!(targets, TargetMode::List(_)))?;

    Ok(RunConfig {
        base_url: base_url.to_owned(),
        targets,
        bound,
        concurrency,
        request_timeout,
        method,
        body: if method == HttpMethod::Get { None } else { body },
        header,
        keep_alive: !common.disable_keep_alive,
    })
}

fn resolve_bound(common: &CommonArgs, list_mode: bool) -> AppResult<RunBound> {
    match (common.duration, common.requests) {
        (Some(duration), Some(requests)) => {
            warn!(
                "Both --duration ({:?}) and --requests ({}) were set; running for the duration.",
                duration,
                requests.get()
            );
            Ok(RunBound::Duration(duration))
        }
        (Some(duration), None) => Ok(RunBound::Duration(duration)),
        (None, Some(requests)) => Ok(RunBound::Requests(requests)),
        (None, None) if list_mode => Ok(RunBound::EachTargetOnce),
        (None, None) => Err(AppError::validation(ValidationError::MissingRequestCount)),
    }
}
