//! Request samples and their reduction into run statistics.
mod aggregate;
mod stats;
mod types;

#[cfg(test)]
mod tests;

pub use aggregate::aggregate;
pub use types::{FailureKind, PhaseStats, ResultMetrics, Sample, SampleOutcome};
