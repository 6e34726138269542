use std::path::PathBuf;

use bytes::Bytes;

use crate::args::{Command, TesterArgs};
use crate::config::{SourceLocation, apply_config, build_run_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::read_source;
use crate::sinks::DEFAULT_JSON_METRICS_FILE;

use super::types::{OutputPlan, RunPlan};

pub(crate) async fn build_plan(args: TesterArgs) -> AppResult<RunPlan> {
    let TesterArgs {
        mut command,
        no_color,
        ..
    } = args;

    if let Some(config) = load_config(command.common().config.as_deref())? {
        apply_config(&mut command, &config)?;
    }

    let body = load_body(&command).await?;
    let config = build_run_config(&command, body)?;

    let common = command.common();
    let json_metrics = common.json_metrics.then(|| {
        PathBuf::from(
            common
                .json_metrics_file
                .as_deref()
                .unwrap_or(DEFAULT_JSON_METRICS_FILE),
        )
    });
    let pushgateway = common
        .prompushgwurl
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned);

    Ok(RunPlan {
        config,
        outputs: OutputPlan {
            no_color,
            json_metrics,
            pushgateway,
        },
    })
}

async fn load_body(command: &Command) -> AppResult<Option<Bytes>> {
    let Command::Run(args) = command else {
        return Ok(None);
    };
    let Some(location) = args.postfile.as_deref().or(args.putfile.as_deref()) else {
        return Ok(None);
    };
    let source = SourceLocation::parse(location)?;
    let body = read_source(&source).await.map_err(|err| {
        AppError::validation(ValidationError::BodyUnavailable {
            location: location.to_owned(),
            reason: err.to_string(),
        })
    })?;
    Ok(Some(body))
}
