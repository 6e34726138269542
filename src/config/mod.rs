//! Configuration loading, application, and the validated run plan.
pub(crate) mod apply;
mod build;
mod loader;
mod run;
pub mod types;


pub use apply::apply_config;
pub use build::{DEFAULT_REQUEST_TIMEOUT, build_run_config};
pub use loader::load_config;
pub use run::{
    RequestHeader, RunBound, RunConfig, SourceLocation, SuffixSource, TargetMode,
    validate_base_url,
};
pub use types::ConfigFile;

#[cfg(test)]
pub(crate) use loader::load_config_file;
