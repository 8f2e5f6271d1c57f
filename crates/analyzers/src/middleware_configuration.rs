use laravel_guard::analyzer::*;
use laravel_guard::result::*;
use once_cell::sync::Lazy;
use regex::Regex;

const KERNEL: &str = "app/Http/Kernel.php";

static COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)/\*.*?\*/|//[^\n]*|#[^\[\n][^\n]*|#\n").expect("valid comment regex")
});

static PROXIES_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"protected\s+\$proxies\s*=\s*([^;]+);").expect("valid proxies regex")
});

/// Blank out PHP comments while keeping line numbers intact
fn strip_comments(source: &str) -> String {
    COMMENT
        .replace_all(source, |caps: &regex::Captures| {
            "\n".repeat(caps[0].matches('\n').count())
        })
        .into_owned()
}

/// 1-based line of the first reference to `class` in `source`
fn find_reference(source: &str, class: &str) -> Option<usize> {
    source
        .lines()
        .position(|line| line.contains(class))
        .map(|idx| idx + 1)
}

struct MiddlewareRule {
    class: &'static str,
    severity: Severity,
    missing: &'static str,
    recommendation: &'static str,
    is_configured: fn(&AnalysisContext) -> bool,
}

fn trusted_proxies_configured(ctx: &AnalysisContext) -> bool {
    if ctx
        .config
        .get("trustedproxy.proxies")
        .is_some_and(|v| !v.is_empty())
    {
        return true;
    }
    let Some(source) = ctx.read_file("app/Http/Middleware/TrustProxies.php") else {
        return false;
    };
    let source = strip_comments(&source);
    PROXIES_ASSIGNMENT
        .captures(&source)
        .map(|caps| caps[1].trim().to_string())
        .is_some_and(|value| !matches!(value.as_str(), "null" | "[]" | "''" | "\"\""))
}

fn cors_configured(ctx: &AnalysisContext) -> bool {
    ctx.exists("config/cors.php") || ctx.config.has("cors.paths")
}

const RULES: &[MiddlewareRule] = &[
    MiddlewareRule {
        class: "TrustProxies",
        severity: Severity::Medium,
        missing: "TrustProxies middleware is registered but no trusted proxies are configured.",
        recommendation: "Set the $proxies property of the TrustProxies middleware to your load \
                         balancer addresses; otherwise client IPs and HTTPS detection are wrong \
                         behind a proxy.",
        is_configured: trusted_proxies_configured,
    },
    MiddlewareRule {
        class: "HandleCors",
        severity: Severity::Low,
        missing: "HandleCors middleware is registered but config/cors.php is missing.",
        recommendation: "Publish config/cors.php and restrict allowed_origins and paths to the \
                         routes that need cross-origin access.",
        is_configured: cors_configured,
    },
];

/// Checks that middleware registered in the HTTP kernel has the configuration
/// it depends on.
pub struct MiddlewareConfiguration {
    metadata: AnalyzerMetadata,
}

impl MiddlewareConfiguration {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "middleware-configuration",
                "Registered middleware is configured",
                Category::Security,
                Severity::Medium,
                &["middleware", "http", "security"],
            ),
        }
    }
}

impl Default for MiddlewareConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for MiddlewareConfiguration {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }

    fn skip_reason(&self, ctx: &AnalysisContext) -> Option<String> {
        if ctx.exists(KERNEL) {
            None
        } else {
            Some(format!(
                "{KERNEL} not found; middleware registered in bootstrap/app.php is not inspected"
            ))
        }
    }

    fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
        let Some(kernel) = ctx.read_file(KERNEL) else {
            return AnalysisResult::error(format!("Could not read {KERNEL}"));
        };
        let kernel = strip_comments(&kernel);

        let issues: Vec<Issue> = RULES
            .iter()
            .filter_map(|rule| {
                let line = find_reference(&kernel, rule.class)?;
                if (rule.is_configured)(ctx) {
                    return None;
                }
                Some(
                    Issue::new(rule.missing, rule.severity, rule.recommendation)
                        .at(Location::line(KERNEL, line))
                        .with_meta("middleware", rule.class),
                )
            })
            .collect();

        AnalysisResult::from_issues(
            IssueStatus::Warning,
            "Registered middleware is configured.",
            "Registered middleware is missing its configuration.",
            issues,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laravel_guard::repository::ConfigRepository;
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    const KERNEL_SOURCE: &str = r#"<?php

namespace App\Http;

use Illuminate\Foundation\Http\Kernel as HttpKernel;

class Kernel extends HttpKernel
{
    protected $middleware = [
        \App\Http\Middleware\TrustProxies::class,
        \Illuminate\Http\Middleware\HandleCors::class,
        \App\Http\Middleware\PreventRequestsDuringMaintenance::class,
    ];
}
"#;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn analyze(root: &Path, config: serde_json::Value) -> AnalysisResult {
        let config = ConfigRepository::from_json(config);
        let ctx = AnalysisContext::new(root, "production", &config);
        MiddlewareConfiguration::new().analyze(&ctx)
    }

    #[test]
    fn test_strip_comments_keeps_lines() {
        let source = "a\n/* one\ntwo */\n// TrustProxies\n# HandleCors\n#[Attribute]\nb";
        let stripped = strip_comments(source);
        assert_eq!(stripped.lines().count(), source.lines().count());
        assert!(!stripped.contains("TrustProxies"));
        assert!(!stripped.contains("HandleCors"));
        assert!(stripped.contains("#[Attribute]"));
        assert_eq!(find_reference(&stripped, "#[Attribute]"), Some(6));
    }

    #[test]
    fn test_unconfigured_middleware_warns() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), KERNEL, KERNEL_SOURCE);
        write(
            dir.path(),
            "app/Http/Middleware/TrustProxies.php",
            "<?php\nclass TrustProxies extends Middleware\n{\n    protected $proxies;\n}\n",
        );

        let result = analyze(dir.path(), json!({}));
        assert_eq!(result.status(), Status::Warning);
        assert_eq!(result.issues().len(), 2);
        assert_eq!(result.issues()[0].location(), Some(&Location::line(KERNEL, 10)));
        assert_eq!(result.issues()[0].meta("middleware"), Some(&json!("TrustProxies")));
        assert_eq!(result.issues()[1].meta("middleware"), Some(&json!("HandleCors")));
    }

    #[test]
    fn test_configured_middleware_passes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), KERNEL, KERNEL_SOURCE);
        write(
            dir.path(),
            "app/Http/Middleware/TrustProxies.php",
            "<?php\nclass TrustProxies extends Middleware\n{\n    protected $proxies = ['10.0.0.0/8'];\n}\n",
        );
        write(dir.path(), "config/cors.php", "<?php return ['paths' => ['api/*']];\n");

        assert_eq!(analyze(dir.path(), json!({})).status(), Status::Passed);
    }

    #[test]
    fn test_proxies_from_config_and_null_assignment() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), KERNEL, KERNEL_SOURCE);
        write(dir.path(), "config/cors.php", "<?php return [];\n");
        write(
            dir.path(),
            "app/Http/Middleware/TrustProxies.php",
            "<?php\nclass TrustProxies\n{\n    protected $proxies = null;\n}\n",
        );

        assert_eq!(analyze(dir.path(), json!({})).status(), Status::Warning);
        let result = analyze(dir.path(), json!({ "trustedproxy": { "proxies": "*" } }));
        assert_eq!(result.status(), Status::Passed);
    }

    #[test]
    fn test_commented_out_middleware_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            KERNEL,
            "<?php\nclass Kernel\n{\n    protected $middleware = [\n        // \\App\\Http\\Middleware\\TrustProxies::class,\n    ];\n}\n",
        );
        assert_eq!(analyze(dir.path(), json!({})).status(), Status::Passed);
    }

    #[test]
    fn test_skips_without_kernel() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigRepository::default();
        let ctx = AnalysisContext::new(dir.path(), "production", &config);
        let reason = MiddlewareConfiguration::new().skip_reason(&ctx).unwrap();
        assert!(reason.contains("bootstrap/app.php"));
    }
}
