pub mod runner;

pub use runner::{CancelToken, RunHandle, RunOutcome, Runner};
