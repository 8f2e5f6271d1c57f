use std::path::PathBuf;

use serde::Serialize;

use crate::analyzer::AnalyzerOutcome;
use crate::result::{Severity, Status};

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub passed: usize,
    pub warning: usize,
    pub failed: usize,
    pub error: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub project: PathBuf,
    pub environment: String,
    pub analyzers_run: usize,
    pub results_by_status: StatusCounts,
    pub total_issues: usize,
    pub issues_by_severity: SeverityCounts,
    pub outcomes: Vec<AnalyzerOutcome>,
}

impl AnalysisReport {
    pub fn from_outcomes(
        project: PathBuf,
        environment: impl Into<String>,
        outcomes: Vec<AnalyzerOutcome>,
    ) -> Self {
        let mut statuses = StatusCounts::default();
        let mut severities = SeverityCounts::default();

        for outcome in &outcomes {
            match outcome.result.status() {
                Status::Passed => statuses.passed += 1,
                Status::Warning => statuses.warning += 1,
                Status::Failed => statuses.failed += 1,
                Status::Error => statuses.error += 1,
                Status::Skipped => statuses.skipped += 1,
            }
            for issue in outcome.result.issues() {
                match issue.severity() {
                    Severity::Critical => severities.critical += 1,
                    Severity::High => severities.high += 1,
                    Severity::Medium => severities.medium += 1,
                    Severity::Low => severities.low += 1,
                }
            }
        }

        let total_issues = outcomes.iter().map(|o| o.result.issues().len()).sum();
        Self {
            project,
            environment: environment.into(),
            analyzers_run: outcomes.len() - statuses.skipped,
            results_by_status: statuses,
            total_issues,
            issues_by_severity: severities,
            outcomes,
        }
    }

    /// Whether any check failed or could not complete; with `strict`,
    /// warnings count too.
    pub fn has_failures(&self, strict: bool) -> bool {
        let counts = &self.results_by_status;
        counts.failed > 0 || counts.error > 0 || (strict && counts.warning > 0)
    }
}
