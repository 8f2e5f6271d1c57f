use laravel_guard::analyzer::*;
use laravel_guard::repository::ConfigValue;
use laravel_guard::result::*;

/// Checks that the default cache store persists between requests and is
/// shared between servers.
pub struct CacheDriver {
    metadata: AnalyzerMetadata,
    environments: RelevantEnvironments,
}

impl CacheDriver {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "cache-driver",
                "Cache driver is suitable for production",
                Category::Performance,
                Severity::High,
                &["cache", "performance"],
            ),
            environments: RelevantEnvironments::production(),
        }
    }
}

impl Default for CacheDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for CacheDriver {
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
        let Some(store) = ctx.config.get_str("cache.default") else {
            return AnalysisResult::passed("No default cache store is configured.");
        };
        let driver = ctx
            .config
            .get("cache.stores")
            .and_then(ConfigValue::as_mapping)
            .and_then(|stores| stores.get(store))
            .and_then(ConfigValue::as_mapping)
            .and_then(|s| s.get("driver"))
            .and_then(ConfigValue::as_str)
            .unwrap_or(store);

        let issue = |status: IssueStatus, severity: Severity, problem: &str, recommendation: &str| {
            AnalysisResult::single(
                status,
                format!("Cache driver '{driver}' {problem}."),
                Issue::new(
                    format!(
                        "The '{store}' cache store uses the {driver} driver, which {problem}."
                    ),
                    severity,
                    recommendation,
                )
                .at(Location::file("config/cache.php"))
                .with_meta("store", store)
                .with_meta("driver", driver)
                .with_meta("environment", ctx.environment),
            )
        };

        match driver {
            "array" | "null" => issue(
                IssueStatus::Failed,
                Severity::High,
                "does not persist anything between requests",
                "Use redis, memcached, dynamodb or database for the default cache store.",
            ),
            "file" => issue(
                IssueStatus::Warning,
                Severity::Low,
                "is not shared between servers",
                "Use redis or memcached when running more than one application server.",
            ),
            _ => AnalysisResult::passed(format!("Cache driver '{driver}' is properly configured.")),
        }
    }
}
