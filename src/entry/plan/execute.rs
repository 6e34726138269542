use crate::app::run_load_test;
use crate::error::AppResult;
use crate::sinks::{print_summary, push_metrics, write_json_metrics};

use super::types::RunPlan;

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let metrics = run_load_test(&plan.config).await?;
    print_summary(&metrics, plan.outputs.no_color)?;

    if let Some(path) = plan.outputs.json_metrics.as_deref() {
        write_json_metrics(path, &metrics).await?;
    }
    if let Some(gateway) = plan.outputs.pushgateway.as_deref() {
        push_metrics(gateway, &metrics).await?;
    }
    Ok(())
}
