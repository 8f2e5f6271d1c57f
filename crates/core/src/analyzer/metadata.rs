use std::collections::BTreeSet;

use serde::Serialize;

use crate::result::Severity;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Category {
    Performance,
    Security,
    Reliability,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Performance => write!(f, "Performance"),
            Category::Security => write!(f, "Security"),
            Category::Reliability => write!(f, "Reliability"),
        }
    }
}

/// Static identity of an analyzer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyzerMetadata {
    /// Stable key used in config files and on the command line (e.g. "queue-driver")
    pub id: String,
    pub name: String,
    pub category: Category,
    /// Default severity of issues from this analyzer
    pub severity: Severity,
    pub tags: BTreeSet<String>,
}

impl AnalyzerMetadata {
    pub fn new(id: &str, name: &str, category: Category, severity: Severity, tags: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            severity,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}
