//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, CommonArgs, RunArgs, RunFileArgs, TesterArgs};
pub use types::{HttpMethod, PositiveU64, PositiveUsize};

pub(crate) use parsers::{parse_duration_arg, parse_header};

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loadphase/", env!("CARGO_PKG_VERSION"));
