pub mod kind;
pub mod registry;
pub mod result;

pub use kind::MetricKind;
pub use registry::MetricRegistry;
pub use result::{percentage, round2, Block, MetricResult};

use crate::document::Document;
use crate::infrastructure::MetricError;

/// A pure function from a document to one result.
pub trait Metric: Send + Sync {
    fn kind(&self) -> MetricKind;

    fn extract(&self, document: &Document) -> Result<MetricResult, MetricError>;

    fn label(&self) -> &'static str {
        self.kind().label()
    }
}
