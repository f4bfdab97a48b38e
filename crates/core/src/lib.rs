pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

pub use config::EngineConfig;
pub use error::{PpcError, PpcResult};
pub use metrics::MetricsRollup;
pub use types::PerformanceSample;
