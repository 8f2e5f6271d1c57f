use std::path::PathBuf;

use super::context::{AnalysisContext, RelevantEnvironments};
use super::metadata::AnalyzerMetadata;
use crate::result::AnalysisResult;

/// Core trait for all analyzers.
/// Implementors inspect a Laravel project and return a single result.
pub trait Analyzer: Send + Sync {
    /// Static identity: id, display name, category, default severity, tags
    fn metadata(&self) -> &AnalyzerMetadata;

    /// Why this analyzer does not apply to the context, or `None` when it does.
    /// Must be side-effect free.
    fn skip_reason(&self, ctx: &AnalysisContext) -> Option<String>;

    fn should_run(&self, ctx: &AnalysisContext) -> bool {
        self.skip_reason(ctx).is_none()
    }

    /// Run the check. Expected failure modes are reported through the result
    /// status, never by panicking.
    fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult;

    /// Whether the check is meaningful in a non-interactive CI environment
    fn run_in_ci(&self) -> bool {
        true
    }

    /// Override the directories the analyzer inspects, relative to the base path.
    /// Analyzers that don't scan directories ignore this.
    fn set_paths(&mut self, _paths: Vec<PathBuf>) {}

    /// The environments the analyzer applies to, or `None` when it runs
    /// regardless of environment.
    fn relevant_environments(&self) -> Option<&RelevantEnvironments> {
        None
    }

    /// Override the environments the analyzer applies to.
    /// Analyzers that aren't environment-specific ignore this.
    fn set_relevant_environments(&mut self, _environments: Vec<String>) {}
}
