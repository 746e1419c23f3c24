pub mod cohesion;
pub mod complexity;
pub mod counts;
pub mod duplication;
pub mod lexical;
pub mod methods;

// Re-export commonly used types
pub use cohesion::CohesionAnalyzer;
pub use complexity::{AverageMethodSize, CognitiveComplexityCalculator, NestingDepthAnalyzer};
pub use duplication::{DuplicationConfig, ExactDuplicationDetector, NormalizedDuplicationDetector};
pub use lexical::{BlockTracker, LexicalScanner, ScannedLine};
pub use methods::{MethodExtractor, MethodSpan};
