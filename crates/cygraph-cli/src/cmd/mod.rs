pub mod bounds;
pub mod completions;
pub mod metrics;
pub mod suite;
