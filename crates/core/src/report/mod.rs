mod types;

pub use types::{AnalysisReport, SeverityCounts, StatusCounts};
