use serde::Deserialize;

/// On-disk configuration. Keys mirror the long CLI flags; CLI values win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub concurrency: Option<usize>,
    pub requests: Option<u64>,
    pub duration: Option<DurationValue>,
    pub timeout: Option<u64>,
    pub header: Option<String>,
    pub file: Option<String>,
    pub postfile: Option<String>,
    pub putfile: Option<String>,
    pub json_metrics: Option<bool>,
    pub json_metrics_file: Option<String>,
    #[serde(alias = "pushgateway")]
    pub prompushgwurl: Option<String>,
    pub disable_keep_alive: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}
