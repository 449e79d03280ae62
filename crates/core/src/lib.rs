pub mod config;
pub mod envelope;
pub mod error;
pub mod loyalty;
pub mod types;

pub use config::AppConfig;
pub use envelope::{ApiEnvelope, ResponseMetadata};
pub use error::{PassdeskError, PassdeskResult};
