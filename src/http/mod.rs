//! Target resolution, instrumented probing, and the worker pool.
mod probe;
mod resolve;
mod source;
mod workers;

#[cfg(test)]
mod test_support;

pub use probe::Prober;
pub use resolve::{join_suffixes, resolve_targets};
pub use source::read_source;
pub use workers::{RequestShare, RunOutcome, coordinate, split_requests};
