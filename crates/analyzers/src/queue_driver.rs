use laravel_guard::analyzer::*;
use laravel_guard::repository::ConfigValue;
use laravel_guard::result::*;

/// Checks that the default queue connection hands jobs to a real worker.
/// The `null` driver drops every job and `sync` runs them inside the request.
pub struct QueueDriver {
    metadata: AnalyzerMetadata,
    environments: RelevantEnvironments,
}

impl QueueDriver {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "queue-driver",
                "Queue driver is suitable for production",
                Category::Reliability,
                Severity::Critical,
                &["queue", "reliability"],
            ),
            environments: RelevantEnvironments::production(),
        }
    }
}

impl Default for QueueDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for QueueDriver {
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
        let Some(default) = ctx.config.get("queue.default") else {
            return AnalysisResult::passed("No default queue connection is configured.");
        };
        let Some(connection) = default.as_str() else {
            return AnalysisResult::error(format!(
                "queue.default must be a connection name, found a value of type {}",
                default.type_name()
            ));
        };

        // The framework resolves the "null" connection without looking it up.
        let driver = if connection == "null" {
            "null"
        } else {
            let config = ctx
                .config
                .get("queue.connections")
                .and_then(ConfigValue::as_mapping)
                .and_then(|connections| connections.get(connection));
            match config {
                Some(config) => config
                    .as_mapping()
                    .and_then(|m| m.get("driver"))
                    .and_then(|d| d.as_str())
                    .unwrap_or(connection),
                None => {
                    return AnalysisResult::single(
                        IssueStatus::Failed,
                        format!("Queue connection '{connection}' is not defined."),
                        Issue::new(
                            format!(
                                "The default queue connection '{connection}' has no entry in \
                                 queue.connections, so dispatching a job will throw."
                            ),
                            Severity::Critical,
                            "Define the connection in config/queue.php or point \
                             QUEUE_CONNECTION at an existing connection.",
                        )
                        .with_meta("connection", connection)
                        .with_meta("environment", ctx.environment),
                    );
                }
            }
        };

        match driver {
            "null" => AnalysisResult::single(
                IssueStatus::Warning,
                "Queue driver 'null' discards all jobs.",
                Issue::new(
                    format!(
                        "The '{connection}' queue connection uses the null driver in the {} \
                         environment.",
                        ctx.environment
                    ),
                    Severity::Critical,
                    "The null driver silently discards every queued job, which means data \
                     loss for mails, notifications and any deferred work. Use redis, sqs, \
                     beanstalkd or database.",
                )
                .with_meta("connection", connection)
                .with_meta("driver", driver)
                .with_meta("environment", ctx.environment),
            ),
            "sync" => AnalysisResult::single(
                IssueStatus::Warning,
                "Queue driver 'sync' runs jobs inside the request.",
                Issue::new(
                    format!(
                        "The '{connection}' queue connection uses the sync driver in the {} \
                         environment.",
                        ctx.environment
                    ),
                    Severity::High,
                    "Jobs run synchronously during the HTTP request, adding their full \
                     duration to response times. Use an asynchronous driver such as redis \
                     or sqs with queue workers.",
                )
                .with_meta("connection", connection)
                .with_meta("driver", driver)
                .with_meta("environment", ctx.environment),
            ),
            _ => AnalysisResult::passed(format!("Queue driver '{driver}' is properly configured.")),
        }
    }
}
