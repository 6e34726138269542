//! Core library for the `loadphase` CLI.
//!
//! The binary resolves a target URL (or a base URL plus a list of path
//! suffixes), drives concurrent workers that time each request's DNS, connect,
//! server processing and content transfer phases, and reduces the samples into
//! mean/median/p95 summaries. The modules here are its building blocks; the
//! library API follows the CLI's needs.
pub mod app;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod sinks;
