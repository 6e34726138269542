use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::config::{RunConfig, SuffixSource, TargetMode};
use crate::error::{AppError, AppResult, ResolveError};

use super::source::read_source;

/// Produces the ordered list of URLs a run targets.
///
/// # Errors
///
/// Returns an error when the suffix source is unreadable, empty, or yields an
/// unparsable URL.
pub async fn resolve_targets(config: &RunConfig) -> AppResult<Arc<[Url]>> {
    match &config.targets {
        TargetMode::Single => {
            let url = parse_target(&config.base_url)?;
            Ok(Arc::from(vec![url]))
        }
        TargetMode::List(source) => {
            let lines = load_suffixes(source).await?;
            let targets = join_suffixes(&config.base_url, &lines, &source.to_string())?;
            debug!("Resolved {} target URLs", targets.len());
            Ok(Arc::from(targets))
        }
    }
}

async fn load_suffixes(source: &SuffixSource) -> AppResult<Vec<String>> {
    match source {
        SuffixSource::Inline(lines) => Ok(lines.clone()),
        SuffixSource::Location(location) => {
            let content = read_source(location).await.map_err(|err| {
                AppError::resolve(ResolveError::SourceUnavailable {
                    location: location.to_string(),
                    reason: err.to_string(),
                })
            })?;
            Ok(String::from_utf8_lossy(&content)
                .lines()
                .map(str::to_owned)
                .collect())
        }
    }
}

/// Appends each non-blank trimmed suffix to `base_url`, keeping input order.
///
/// # Errors
///
/// Returns an error when nothing usable remains or a joined URL does not parse.
pub fn join_suffixes(base_url: &str, lines: &[String], location: &str) -> AppResult<Vec<Url>> {
    let targets = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|suffix| parse_target(&format!("{}{}", base_url, suffix)))
        .collect::<AppResult<Vec<Url>>>()?;
    if targets.is_empty() {
        return Err(AppError::resolve(ResolveError::EmptySourceList {
            location: location.to_owned(),
        }));
    }
    Ok(targets)
}

fn parse_target(value: &str) -> AppResult<Url> {
    Url::parse(value).map_err(|err| {
        AppError::resolve(ResolveError::InvalidTarget {
            url: value.to_owned(),
            source: err,
        })
    })
}
