// Domain modules
pub mod config;
pub mod error;
pub mod method;
pub mod metrics;
pub mod record;

pub use config::BenchmarkConfig;
pub use error::{CsvBurnError, Result};
pub use method::ReadMethod;
pub use metrics::{Sample, StrategySummary};
pub use record::{FileMetadata, ResultRecord};
