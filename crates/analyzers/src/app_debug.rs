use laravel_guard::analyzer::*;
use laravel_guard::result::*;

/// Detects debug mode left on, which renders stack traces and environment
/// details to visitors.
pub struct AppDebug {
    metadata: AnalyzerMetadata,
    environments: RelevantEnvironments,
}

impl AppDebug {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "app-debug",
                "Debug mode is disabled",
                Category::Security,
                Severity::Critical,
                &["security", "debug"],
            ),
            environments: RelevantEnvironments::production(),
        }
    }
}

impl Default for AppDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AppDebug {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }

    fn skip_reason(&self, ctx: &AnalysisContext) -> Option<String> {
        self.environments.skip_reason(ctx)
    }

    fn relevant_environments(&self) -> Option<&RelevantEnvironments> {
        Some(&self.environments)
    }

    fn set_relevant_environments(&mut self, environments: Vec<String>) {
        self.environments.set(environments);
    }

    fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
        let enabled = ctx
            .config
            .get("app.debug")
            .and_then(|v| v.as_flag())
            .unwrap_or(false);
        if !enabled {
            return AnalysisResult::passed("Debug mode is disabled.");
        }

        AnalysisResult::single(
            IssueStatus::Failed,
            "Debug mode is enabled.",
            Issue::new(
                format!("APP_DEBUG is enabled in the {} environment.", ctx.environment),
                self.metadata.severity,
                "Set APP_DEBUG=false. Debug error pages expose stack traces, queries and \
                 environment variables including credentials.",
            )
            .at(Location::file("config/app.php"))
            .with_meta("environment", ctx.environment),
        )
    }
}
