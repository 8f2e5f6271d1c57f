use laravel_guard::analyzer::*;
use laravel_guard::result::*;

/// Route cache file names, newest framework format first
const CACHED_ROUTES: &[&str] = &["bootstrap/cache/routes-v7.php", "bootstrap/cache/routes.php"];

/// Checks that `php artisan route:cache` was run on the deployed release.
pub struct RouteCaching {
    metadata: AnalyzerMetadata,
    environments: RelevantEnvironments,
}

impl RouteCaching {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "route-caching",
                "Routes are cached",
                Category::Performance,
                Severity::Medium,
                &["cache", "deployment", "performance"],
            ),
            environments: RelevantEnvironments::production(),
        }
    }
}

impl Default for RouteCaching {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for RouteCaching {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }

    fn skip_reason(&self, ctx: &AnalysisContext) -> Option<String> {
        self.environments.skip_reason(ctx)
    }

    fn run_in_ci(&self) -> bool {
        false
    }

    fn relevant_environments(&self) -> Option<&RelevantEnvironments> {
        Some(&self.environments)
    }

    fn set_relevant_environments(&mut self, environments: Vec<String>) {
        self.environments.set(environments);
    }

    fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
        if let Some(cached) = CACHED_ROUTES.iter().find(|f| ctx.exists(f)) {
            return AnalysisResult::passed(format!("Routes are cached in {cached}."));
        }
        AnalysisResult::single(
            IssueStatus::Warning,
            "Routes are not cached.",
            Issue::new(
                "No route cache exists, so routes are registered on every request.",
                self.metadata.severity,
                "Run `php artisan route:cache` as part of every deployment.",
            )
            .with_meta("expected_file", CACHED_ROUTES[0])
            .with_meta("environment", ctx.environment),
        )
    }
}
