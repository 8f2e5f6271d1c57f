pub mod context;
pub mod metadata;
pub mod registry;
pub mod traits;

pub use context::{AnalysisContext, RelevantEnvironments};
pub use metadata::{AnalyzerMetadata, Category};
pub use registry::{AnalyzerOutcome, AnalyzerRegistry};
pub use traits::Analyzer;
