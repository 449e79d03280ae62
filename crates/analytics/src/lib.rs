pub mod aggregator;

pub use aggregator::{aggregate, retention_rate};
