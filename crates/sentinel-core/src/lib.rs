pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod export;
pub mod fingerprint;
pub mod model;
pub mod report;
pub mod source;
pub mod thresholds;
