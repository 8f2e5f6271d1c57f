use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

/// How urgently an issue needs attention before deploying. Variants are
/// declared most urgent first, so sorting a list of issues puts critical ones
/// at the top.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
        }
    }
}

impl Severity {
    pub fn parse(s: &str) -> Option<Severity> {
        match s.to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Outcome class of a single analyzer run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Warning,
    Failed,
    Error,
    Skipped,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Passed => write!(f, "Passed"),
            Status::Warning => write!(f, "Warning"),
            Status::Failed => write!(f, "Failed"),
            Status::Error => write!(f, "Error"),
            Status::Skipped => write!(f, "Skipped"),
        }
    }
}

/// The two statuses that must carry at least one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
    Warning,
    Failed,
}

impl From<IssueStatus> for Status {
    fn from(status: IssueStatus) -> Self {
        match status {
            IssueStatus::Warning => Status::Warning,
            IssueStatus::Failed => Status::Failed,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResultError {
    #[error("a {0} result must carry at least one issue")]
    MissingIssues(Status),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Location {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Location {
    pub fn file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }

    pub fn line(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }
}

/// A single finding within an analyzer result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Issue {
    message: String,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, Value>,
    recommendation: String,
}

impl Issue {
    pub fn new(
        message: impl Into<String>,
        severity: Severity,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            location: None,
            metadata: BTreeMap::new(),
            recommendation: recommendation.into(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

/// Immutable outcome of one analyzer run.
///
/// Warning and Failed results always carry at least one issue; the other
/// statuses never do. The constructors are the only way to build one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisResult {
    status: Status,
    message: String,
    issues: Vec<Issue>,
}

impl AnalysisResult {
    pub fn passed(message: impl Into<String>) -> Self {
        Self::bare(Status::Passed, message)
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::bare(Status::Skipped, reason)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::bare(Status::Error, message)
    }

    pub fn warning(message: impl Into<String>, issues: Vec<Issue>) -> Result<Self, ResultError> {
        Self::with_issues(IssueStatus::Warning, message, issues)
    }

    pub fn failed(message: impl Into<String>, issues: Vec<Issue>) -> Result<Self, ResultError> {
        Self::with_issues(IssueStatus::Failed, message, issues)
    }

    pub fn with_issues(
        status: IssueStatus,
        message: impl Into<String>,
        issues: Vec<Issue>,
    ) -> Result<Self, ResultError> {
        if issues.is_empty() {
            return Err(ResultError::MissingIssues(status.into()));
        }
        Ok(Self {
            status: status.into(),
            message: message.into(),
            issues,
        })
    }

    /// A Warning or Failed result carrying exactly one issue.
    pub fn single(status: IssueStatus, message: impl Into<String>, issue: Issue) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            issues: vec![issue],
        }
    }

    /// Passed with `pass_message` when `issues` is empty, otherwise `status`
    /// with `issue_message`.
    pub fn from_issues(
        status: IssueStatus,
        pass_message: impl Into<String>,
        issue_message: impl Into<String>,
        issues: Vec<Issue>,
    ) -> Self {
        if issues.is_empty() {
            Self::passed(pass_message)
        } else {
            Self {
                status: status.into(),
                message: issue_message.into(),
                issues,
            }
        }
    }

    fn bare(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Build a new result without the issues matching `drop`. A result left
    /// with no issues degrades to Passed.
    pub fn without_issues<F>(self, drop: F) -> Self
    where
        F: Fn(&Issue) -> bool,
    {
        if self.issues.is_empty() {
            return self;
        }
        let before = self.issues.len();
        let issues: Vec<Issue> = self.issues.into_iter().filter(|i| !drop(i)).collect();
        if issues.is_empty() {
            return Self::passed(format!("All {before} issue(s) were suppressed."));
        }
        Self {
            status: self.status,
            message: self.message,
            issues,
        }
    }
}
