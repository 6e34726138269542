use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load generator with per-phase timing and percentile summaries."
)]
pub struct TesterArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Start a load test against a single URL
    Run(RunArgs),
    /// Start a load test in spread mode (base URL plus a list of path suffixes)
    RunFile(RunFileArgs),
}

impl Command {
    #[must_use]
    pub const fn common(&self) -> &CommonArgs {
        match self {
            Command::Run(args) => &args.common,
            Command::RunFile(args) => &args.common,
        }
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct CommonArgs {
    /// Target URL (absolute URI); the base URL in spread mode
    #[arg(long, short, env = "LOADPHASE_URL")]
    pub url: Option<String>,

    /// Number of concurrent users
    #[arg(long, short, value_parser = parse_positive_usize)]
    pub concurrency: Option<PositiveUsize>,

    /// Number of requests to perform
    #[arg(long, short = 'n', value_parser = parse_positive_u64)]
    pub requests: Option<PositiveU64>,

    /// Run for a fixed time instead of a request count (e.g. 30, 30s, 2m)
    #[arg(long, short, value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Per-request timeout in seconds [default: 5]
    #[arg(long, short, value_parser = parse_positive_u64)]
    pub timeout: Option<PositiveU64>,

    /// Prometheus push gateway URL to send metrics to
    #[arg(long, short = 'p', env = "LOADPHASE_PUSHGATEWAY")]
    pub prompushgwurl: Option<String>,

    /// Add an arbitrary header, e.g. 'Host: www.example.com'
    #[arg(long, short = 'H', value_parser = parse_header)]
    pub header: Option<(String, String)>,

    /// Write metrics to a JSON file
    #[arg(long = "json-metrics", short = 'F')]
    pub json_metrics: bool,

    /// Custom JSON metrics path, used with --json-metrics [default: out.json]
    #[arg(long = "json-metrics-file")]
    pub json_metrics_file: Option<String>,

    /// Open a new connection for every request
    #[arg(long = "disable-keep-alive")]
    pub disable_keep_alive: bool,

    /// Config file (TOML or JSON)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// File (local or remote) containing data to POST; content type defaults to application/json
    #[arg(long, conflicts_with = "putfile")]
    pub postfile: Option<String>,

    /// File (local or remote) containing data to PUT; content type defaults to application/json
    #[arg(long, conflicts_with = "postfile")]
    pub putfile: Option<String>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunFileArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path or URL of a newline-delimited file of URL suffixes
    #[arg(long, short)]
    pub file: Option<String>,
}
