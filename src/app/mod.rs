mod runner;

pub use runner::run_load_test;
