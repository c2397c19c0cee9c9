pub mod processor;
pub mod worker;

pub use processor::{BatchProcessor, BatchSummary};
