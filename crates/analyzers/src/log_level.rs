use laravel_guard::analyzer::*;
use laravel_guard::repository::ConfigValue;
use laravel_guard::result::*;

/// Detects debug-level logging on the default log channel. A `stack`
/// channel is expanded one level into the channels it lists.
pub struct LogLevel {
    metadata: AnalyzerMetadata,
    environments: RelevantEnvironments,
}

impl LogLevel {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "log-level",
                "Log level is not set to debug",
                Category::Performance,
                Severity::Medium,
                &["logging", "performance"],
            ),
            environments: RelevantEnvironments::production(),
        }
    }

    /// Channels reached from `default`: the channel itself, then the direct
    /// children of a stack. Children are not expanded further, so a stack
    /// naming itself is visited once per mention.
    fn channels_to_check<'a>(&self, ctx: &'a AnalysisContext, default: &'a str) -> Vec<&'a str> {
        let mut channels = vec![default];
        let Some(config) = channel_config(ctx, default) else {
            return channels;
        };
        if config.get("driver").and_then(ConfigValue::as_str) != Some("stack") {
            return channels;
        }
        if let Some(children) = config.get("channels").and_then(ConfigValue::as_sequence) {
            channels.extend(children.iter().filter_map(ConfigValue::as_str));
        }
        channels
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::new()
    }
}

fn channel_config<'a>(
    ctx: &'a AnalysisContext,
    name: &str,
) -> Option<&'a std::collections::BTreeMap<String, ConfigValue>> {
    ctx.config
        .get("logging.channels")
        .and_then(ConfigValue::as_mapping)
        .and_then(|channels| channels.get(name))
        .and_then(ConfigValue::as_mapping)
}

impl Analyzer for LogLevel {
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
        let Some(default) = ctx.config.get_str("logging.default") else {
            return AnalysisResult::passed("No default log channel is configured.");
        };

        let mut issues = Vec::new();
        for channel in self.channels_to_check(ctx, default) {
            let Some(level) = channel_config(ctx, channel)
                .and_then(|c| c.get("level"))
                .and_then(ConfigValue::as_str)
            else {
                continue;
            };
            if !level.eq_ignore_ascii_case("debug") {
                continue;
            }
            issues.push(
                Issue::new(
                    format!(
                        "Log channel '{channel}' logs at debug level in the {} environment.",
                        ctx.environment
                    ),
                    self.metadata.severity,
                    "Debug logging writes every query, cache hit and framework event, \
                     which slows requests and fills disks. Set LOG_LEVEL to 'error' or \
                     'warning' in production.",
                )
                .at(Location::file("config/logging.php"))
                .with_meta("environment", ctx.environment)
                .with_meta("channel", channel)
                .with_meta("level", level),
            );
        }

        AnalysisResult::from_issues(
            IssueStatus::Warning,
            format!("Log channel '{default}' does not log at debug level."),
            "Debug-level logging is enabled.",
            issues,
        )
    }
}
