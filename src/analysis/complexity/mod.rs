pub mod cognitive;
pub mod method_size;
pub mod nesting;

pub use cognitive::{CognitiveComplexity, CognitiveComplexityCalculator};
pub use method_size::AverageMethodSize;
pub use nesting::{NestingDepth, NestingDepthAnalyzer};
