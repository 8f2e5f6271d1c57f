use laravel_guard::analyzer::*;
use laravel_guard::result::*;

const CACHED_CONFIG: &str = "bootstrap/cache/config.php";

/// Checks that `php artisan config:cache` was run on the deployed release.
pub struct ConfigCaching {
    metadata: AnalyzerMetadata,
    environments: RelevantEnvironments,
}

impl ConfigCaching {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "config-caching",
                "Configuration is cached",
                Category::Performance,
                Severity::Medium,
                &["cache", "deployment", "performance"],
            ),
            environments: RelevantEnvironments::production(),
        }
    }
}

impl Default for ConfigCaching {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for ConfigCaching {
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
        if ctx.exists(CACHED_CONFIG) {
            return AnalysisResult::passed("Configuration is cached.");
        }
        AnalysisResult::single(
            IssueStatus::Warning,
            "Configuration is not cached.",
            Issue::new(
                format!("{CACHED_CONFIG} does not exist, so every request loads all config files."),
                self.metadata.severity,
                "Run `php artisan config:cache` as part of every deployment.",
            )
            .with_meta("expected_file", CACHED_CONFIG)
            .with_meta("environment", ctx.environment),
        )
    }
}
