pub mod error;
pub mod logging;

pub use error::{ErrorSeverity, MetricError};
pub use logging::{setup_logging, LogFormat, LogOutput, LoggingConfig};
