//! Command-line front end for the registry engine
//!
//! All logging goes to stderr; stdout carries only JSON.

pub mod batch;
pub mod error;

pub use batch::{run_batch, BatchItem, BatchOutcome, Document};
pub use error::CliError;
