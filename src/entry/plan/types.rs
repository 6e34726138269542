use std::path::PathBuf;

use crate::config::RunConfig;

/// Where a finished run's metrics go besides the terminal.
pub(in crate::entry) struct OutputPlan {
    pub(super) no_color: bool,
    pub(super) json_metrics: Option<PathBuf>,
    pub(super) pushgateway: Option<String>,
}

pub(in crate::entry) struct RunPlan {
    pub(super) config: RunConfig,
    pub(super) outputs: OutputPlan,
}
