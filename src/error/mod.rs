mod app;
mod config;
mod http;
mod resolve;
mod sink;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::{HttpError, ProbeError};
pub use resolve::{ResolveError, SourceError};
pub use sink::SinkError;
pub use validation::ValidationError;
