use serde::Serialize;

use super::context::AnalysisContext;
use super::metadata::AnalyzerMetadata;
use super::traits::Analyzer;
use crate::result::AnalysisResult;

/// One analyzer's identity paired with the result of running it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerOutcome {
    pub analyzer: AnalyzerMetadata,
    pub result: AnalysisResult,
}

/// Registry that holds all analyzers and runs them against a project.
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    /// Register an analyzer
    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Register multiple analyzers at once
    pub fn register_all(&mut self, analyzers: Vec<Box<dyn Analyzer>>) {
        self.analyzers.extend(analyzers);
    }

    /// Run all registered analyzers, in registration order
    pub fn run_all(&self, ctx: &AnalysisContext) -> Vec<AnalyzerOutcome> {
        self.analyzers.iter().map(|a| run_one(a.as_ref(), ctx)).collect()
    }

    /// Run only analyzers matching the given ids
    pub fn run_selected(&self, ids: &[&str], ctx: &AnalysisContext) -> Vec<AnalyzerOutcome> {
        self.analyzers
            .iter()
            .filter(|a| ids.contains(&a.metadata().id.as_str()))
            .map(|a| run_one(a.as_ref(), ctx))
            .collect()
    }

    /// List all registered analyzer ids
    pub fn list_analyzers(&self) -> Vec<&str> {
        self.analyzers
            .iter()
            .map(|a| a.metadata().id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn run_one(analyzer: &dyn Analyzer, ctx: &AnalysisContext) -> AnalyzerOutcome {
    let metadata = analyzer.metadata();
    let _span = tracing::debug_span!("analyzer", id = %metadata.id).entered();

    let result = if ctx.ci && !analyzer.run_in_ci() {
        tracing::debug!("not applicable in CI");
        AnalysisResult::skipped("Not applicable in CI environments")
    } else if let Some(reason) = analyzer.skip_reason(ctx) {
        tracing::debug!(%reason, "skipped");
        AnalysisResult::skipped(reason)
    } else {
        let result = analyzer.analyze(ctx);
        tracing::debug!(status = %result.status(), issues = result.issues().len(), "analyzed");
        result
    };

    AnalyzerOutcome {
        analyzer: metadata.clone(),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Category;
    use crate::repository::ConfigRepository;
    use crate::result::{Issue, Severity, Status};
    use std::path::Path;

    struct MockAnalyzer {
        metadata: AnalyzerMetadata,
        ci: bool,
        skip: Option<&'static str>,
    }

    impl MockAnalyzer {
        fn new(id: &str) -> Self {
            Self {
                metadata: AnalyzerMetadata::new(
                    id,
                    "Mock",
                    Category::Performance,
                    Severity::Medium,
                    &["test"],
                ),
                ci: true,
                skip: None,
            }
        }
    }

    impl Analyzer for MockAnalyzer {
        fn metadata(&self) -> &AnalyzerMetadata {
            &self.metadata
        }
        fn skip_reason(&self, _ctx: &AnalysisContext) -> Option<String> {
            self.skip.map(str::to_string)
        }
        fn analyze(&self, _ctx: &AnalysisContext) -> AnalysisResult {
            AnalysisResult::warning(
                "Mock warning",
                vec![Issue::new("mock issue", Severity::Medium, "none")],
            )
            .unwrap()
        }
        fn run_in_ci(&self) -> bool {
            self.ci
        }
    }

    #[test]
    fn test_register_and_run() {
        let mut registry = AnalyzerRegistry::new();
        registry.register(Box::new(MockAnalyzer::new("mock")));

        let config = ConfigRepository::default();
        let ctx = AnalysisContext::new(Path::new("."), "production", &config);
        let outcomes = registry.run_all(&ctx);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].analyzer.id, "mock");
        assert_eq!(outcomes[0].result.status(), Status::Warning);
    }

    #[test]
    fn test_skip_reason_becomes_skipped_result() {
        let mut skipping = MockAnalyzer::new("skipping");
        skipping.skip = Some("Larastan is not installed");
        let mut registry = AnalyzerRegistry::new();
        registry.register(Box::new(skipping));

        let config = ConfigRepository::default();
        let ctx = AnalysisContext::new(Path::new("."), "production", &config);
        let outcomes = registry.run_all(&ctx);

        assert_eq!(outcomes[0].result.status(), Status::Skipped);
        assert_eq!(outcomes[0].result.message(), "Larastan is not installed");
        assert!(outcomes[0].result.issues().is_empty());
    }

    #[test]
    fn test_ci_skips_runtime_analyzers() {
        let mut runtime = MockAnalyzer::new("runtime");
        runtime.ci = false;
        let mut registry = AnalyzerRegistry::new();
        registry.register(Box::new(runtime));
        registry.register(Box::new(MockAnalyzer::new("static")));

        let config = ConfigRepository::default();
        let ctx = AnalysisContext::new(Path::new("."), "production", &config).with_ci(true);
        let outcomes = registry.run_all(&ctx);

        assert_eq!(outcomes[0].result.status(), Status::Skipped);
        assert_eq!(outcomes[1].result.status(), Status::Warning);
    }

    #[test]
    fn test_run_selected() {
        let mut registry = AnalyzerRegistry::new();
        registry.register(Box::new(MockAnalyzer::new("mock")));

        let config = ConfigRepository::default();
        let ctx = AnalysisContext::new(Path::new("."), "production", &config);

        assert!(registry.run_selected(&["nonexistent"], &ctx).is_empty());
        assert_eq!(registry.run_selected(&["mock"], &ctx).len(), 1);
        assert_eq!(registry.list_analyzers(), vec!["mock"]);
    }
}
