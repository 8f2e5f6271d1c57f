mod display;
mod types;

pub use types::{AnalysisResult, Issue, IssueStatus, Location, ResultError, Severity, Status};
