//! Batch intake
//!
//! Turns one batch of queue messages into a list of failed message IDs so the
//! queue redelivers only what failed.

pub mod intake;
pub mod parser;

pub use intake::BatchProcessor;
pub use parser::parse_change_batch;
