use laravel_guard::analyzer::*;
use laravel_guard::probe::CapabilityDetector;
use laravel_guard::result::*;
use laravel_guard::static_analysis::StaticAnalyzer;

/// Larastan packages, current name first
const LARASTAN: &[&str] = &["larastan/larastan", "nunomaduro/larastan"];

/// Message fragment of Larastan's NoEnvCallsOutsideOfConfig rule
const SEARCH_TERM: &str = "outside of the config directory";

/// Detects `env()` calls outside `config/`, which return null once the
/// configuration is cached.
pub struct EnvOutsideConfig {
    metadata: AnalyzerMetadata,
    tool: Box<dyn StaticAnalyzer>,
    larastan_installed: bool,
}

impl EnvOutsideConfig {
    pub fn new(tool: Box<dyn StaticAnalyzer>, larastan_installed: bool) -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "env-outside-config",
                "env() is only called from configuration files",
                Category::Reliability,
                Severity::High,
                &["static-analysis", "config", "reliability"],
            ),
            tool,
            larastan_installed,
        }
    }

    pub fn detect(tool: Box<dyn StaticAnalyzer>, capabilities: &dyn CapabilityDetector) -> Self {
        let installed = LARASTAN.iter().any(|p| capabilities.is_installed(p));
        Self::new(tool, installed)
    }
}

impl Analyzer for EnvOutsideConfig {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }

    fn skip_reason(&self, _ctx: &AnalysisContext) -> Option<String> {
        if self.larastan_installed {
            None
        } else {
            Some(format!(
                "Larastan is not installed (composer require --dev {})",
                LARASTAN[0]
            ))
        }
    }

    fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
        let report = match self.tool.run(ctx.base_path) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(%err, "static analysis failed");
                return AnalysisResult::error(format!("Static analysis failed: {err}"));
            }
        };

        let issues: Vec<Issue> = report
            .parse_analysis(SEARCH_TERM)
            .into_iter()
            .map(|finding| {
                let location = match finding.line {
                    Some(line) => Location::line(&finding.path, line),
                    None => Location::file(&finding.path),
                };
                Issue::new(
                    finding.message,
                    self.metadata.severity,
                    "Read the value in a config file (`'key' => env('KEY')`) and use \
                     config('file.key') in application code; env() returns null once \
                     `php artisan config:cache` has run.",
                )
                .at(location)
            })
            .collect();

        AnalysisResult::from_issues(
            IssueStatus::Failed,
            "env() is only called from configuration files.",
            format!("Found {} env() call(s) outside the config directory.", issues.len()),
            issues,
        )
    }
}
