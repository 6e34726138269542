//! Output sinks for finished runs: terminal table, JSON file, push gateway.
mod format;
mod json;
mod pushgateway;
mod table;


pub use json::{DEFAULT_JSON_METRICS_FILE, write_json_metrics};
pub use pushgateway::{push_metrics, push_url, render_prometheus};
pub use table::{print_summary, render_summary};
