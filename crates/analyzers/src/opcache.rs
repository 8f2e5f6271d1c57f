use laravel_guard::analyzer::*;
use laravel_guard::probe::PhpRuntime;
use laravel_guard::result::*;
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
enum Expectation {
    On,
    Off,
    AtLeast(i64),
}

struct DirectiveRule {
    directive: &'static str,
    expect: Expectation,
    severity: Severity,
    recommendation: &'static str,
}

const RULES: &[DirectiveRule] = &[
    DirectiveRule {
        directive: "opcache.enable",
        expect: Expectation::On,
        severity: Severity::High,
        recommendation: "Enable OPcache with opcache.enable=1 so compiled scripts are cached \
                         instead of being parsed on every request.",
    },
    DirectiveRule {
        directive: "opcache.memory_consumption",
        expect: Expectation::AtLeast(128),
        severity: Severity::Medium,
        recommendation: "Raise opcache.memory_consumption to at least 128 (MB) so the \
                         framework and vendor code fit in the cache.",
    },
    DirectiveRule {
        directive: "opcache.interned_strings_buffer",
        expect: Expectation::AtLeast(16),
        severity: Severity::Low,
        recommendation: "Raise opcache.interned_strings_buffer to at least 16 (MB).",
    },
    DirectiveRule {
        directive: "opcache.max_accelerated_files",
        expect: Expectation::AtLeast(10000),
        severity: Severity::Medium,
        recommendation: "Raise opcache.max_accelerated_files to at least 10000; a typical \
                         application with its vendor directory exceeds the default.",
    },
    DirectiveRule {
        directive: "opcache.validate_timestamps",
        expect: Expectation::Off,
        severity: Severity::Medium,
        recommendation: "Set opcache.validate_timestamps=0 and reset OPcache during deploys \
                         to avoid a filesystem stat on every include.",
    },
];

/// Checks OPcache directives of the running PHP against recommended minimums.
pub struct Opcache {
    metadata: AnalyzerMetadata,
    runtime: PhpRuntime,
}

impl Opcache {
    pub fn new(runtime: PhpRuntime) -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "opcache",
                "OPcache is enabled and sized for production",
                Category::Performance,
                Severity::High,
                &["php", "opcache", "performance"],
            ),
            runtime,
        }
    }

    fn check(&self, rule: &DirectiveRule) -> Option<Issue> {
        let value = self.runtime.directive(rule.directive)?;
        let (current, recommended) = match rule.expect {
            Expectation::AtLeast(min) => {
                let current = value.as_integer()?;
                if current >= min {
                    return None;
                }
                (Value::from(current), Value::from(min))
            }
            Expectation::On | Expectation::Off => {
                let wanted = matches!(rule.expect, Expectation::On);
                if value.as_flag()? == wanted {
                    return None;
                }
                (Value::from(value), Value::from(u8::from(wanted)))
            }
        };

        let message = match rule.expect {
            Expectation::AtLeast(_) => format!(
                "{} is {} which is below the recommended {}.",
                rule.directive, current, recommended
            ),
            Expectation::On => format!("{} is disabled.", rule.directive),
            Expectation::Off => format!("{} is enabled.", rule.directive),
        };

        Some(
            Issue::new(message, rule.severity, rule.recommendation)
                .with_meta("directive", rule.directive)
                .with_meta("current_value", current)
                .with_meta("recommended_value", recommended),
        )
    }
}

impl Analyzer for Opcache {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }

    fn skip_reason(&self, _ctx: &AnalysisContext) -> Option<String> {
        if self.runtime.opcache_loaded {
            None
        } else {
            Some("The OPcache extension is not loaded".to_string())
        }
    }

    fn run_in_ci(&self) -> bool {
        false
    }

    fn analyze(&self, _ctx: &AnalysisContext) -> AnalysisResult {
        let issues: Vec<Issue> = RULES.iter().filter_map(|rule| self.check(rule)).collect();
        AnalysisResult::from_issues(
            IssueStatus::Warning,
            "OPcache is properly configured.",
            format!("{} OPcache directive(s) need attention.", issues.len()),
            issues,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laravel_guard::repository::{ConfigRepository, ConfigValue};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn runtime(directives: &[(&str, ConfigValue)]) -> PhpRuntime {
        let directives: BTreeMap<String, ConfigValue> = directives
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        PhpRuntime::new(true, directives)
    }

    fn analyze(directives: &[(&str, ConfigValue)]) -> AnalysisResult {
        let config = ConfigRepository::default();
        let ctx = AnalysisContext::new(Path::new("."), "production", &config);
        Opcache::new(runtime(directives)).analyze(&ctx)
    }

    fn s(value: &str) -> ConfigValue {
        ConfigValue::String(value.to_string())
    }

    #[test]
    fn test_skips_when_extension_missing() {
        let config = ConfigRepository::default();
        let ctx = AnalysisContext::new(Path::new("."), "production", &config);
        let analyzer = Opcache::new(PhpRuntime::default());
        assert!(!analyzer.should_run(&ctx));
        assert!(analyzer.skip_reason(&ctx).unwrap().contains("not loaded"));
        assert!(!analyzer.run_in_ci());
    }

    #[test]
    fn test_missing_directives_pass() {
        assert_eq!(analyze(&[]).status(), Status::Passed);
    }

    #[test]
    fn test_values_at_minimum_pass() {
        let result = analyze(&[
            ("opcache.enable", s("On")),
            ("opcache.memory_consumption", s("128")),
            ("opcache.interned_strings_buffer", ConfigValue::Integer(16)),
            ("opcache.max_accelerated_files", s("10000")),
            ("opcache.validate_timestamps", s("Off")),
        ]);
        assert_eq!(result.status(), Status::Passed);
        assert!(result.issues().is_empty());
    }

    #[test]
    fn test_one_below_minimum_warns() {
        for (directive, below, minimum) in [
            ("opcache.memory_consumption", 127, 128),
            ("opcache.interned_strings_buffer", 15, 16),
            ("opcache.max_accelerated_files", 9999, 10000),
        ] {
            let result = analyze(&[(directive, s(&below.to_string()))]);
            assert_eq!(result.status(), Status::Warning, "{directive}");
            assert_eq!(result.issues().len(), 1, "{directive}");
            let issue = &result.issues()[0];
            assert_eq!(issue.meta("directive"), Some(&json!(directive)));
            assert_eq!(issue.meta("current_value"), Some(&json!(below)));
            assert_eq!(issue.meta("recommended_value"), Some(&json!(minimum)));
        }
    }

    #[test]
    fn test_one_issue_per_directive() {
        let result = analyze(&[
            ("opcache.enable", s("0")),
            ("opcache.interned_strings_buffer", s("8")),
            ("opcache.max_accelerated_files", ConfigValue::Integer(4000)),
            ("opcache.validate_timestamps", ConfigValue::Bool(true)),
        ]);
        assert_eq!(result.status(), Status::Warning);
        assert_eq!(result.issues().len(), 4);
        assert_eq!(result.issues()[0].severity(), Severity::High);
        assert_eq!(result.issues()[0].meta("current_value"), Some(&json!("0")));
        assert_eq!(result.issues()[0].meta("recommended_value"), Some(&json!(1)));
    }

    #[test]
    fn test_non_numeric_values_are_skipped() {
        let result = analyze(&[
            ("opcache.memory_consumption", ConfigValue::Sequence(vec![s("64")])),
            ("opcache.interned_strings_buffer", ConfigValue::Bool(false)),
            ("opcache.max_accelerated_files", s("plenty")),
        ]);
        assert_eq!(result.status(), Status::Passed);
    }
}
