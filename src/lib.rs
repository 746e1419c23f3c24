// Core modules
pub mod cli;
pub mod config;
pub mod document;
pub mod infrastructure;
pub mod languages;

// Metric engine
pub mod analysis;
pub mod metrics;

pub use document::Document;
pub use languages::Language;
pub use metrics::{Block, Metric, MetricKind, MetricRegistry, MetricResult};

