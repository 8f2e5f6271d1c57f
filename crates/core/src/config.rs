use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analyzer::AnalyzerOutcome;

/// Project-level configuration loaded from `.laravel-guard.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub global: GlobalConfig,
    #[serde(default)]
    pub analyzers: HashMap<String, AnalyzerConfig>,
    #[serde(default)]
    pub suppressions: SuppressionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub output_format: String,
    /// Environment name used when neither `--env` nor `app.env` provide one
    pub environment: Option<String>,
    pub skip_env_specific: bool,
    pub tool_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_format: "text".to_string(),
            environment: None,
            skip_env_specific: false,
            tool_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub enabled: Option<bool>,
    pub relevant_environments: Option<Vec<String>>,
    pub paths: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SuppressionConfig {
    pub files: Vec<String>,
}

impl Config {
    /// Load config from a TOML file path. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check if an analyzer is enabled according to config.
    pub fn is_analyzer_enabled(&self, id: &str) -> bool {
        self.analyzers
            .get(id)
            .and_then(|a| a.enabled)
            .unwrap_or(true)
    }

    pub fn analyzer(&self, id: &str) -> Option<&AnalyzerConfig> {
        self.analyzers.get(id)
    }

    /// Check if a file path should be excluded based on suppression glob patterns.
    pub fn is_file_excluded(&self, file_path: &Path) -> bool {
        let path_str = file_path.to_string_lossy();
        self.suppressions
            .files
            .iter()
            .any(|pattern| glob::Pattern::new(pattern).is_ok_and(|p| p.matches(&path_str)))
    }

    /// Generate default config file content.
    pub fn default_toml() -> &'static str {
        r#"# laravel-guard configuration
# See: https://github.com/safestackai/laravel-guard

[global]
# Output format: "text", "json", "sarif"
output_format = "text"
# Environment to assume when --env is not given and app.env is not in the config dump
# environment = "production"
# Skip analyzers that only apply to specific environments
skip_env_specific = false
# Upper bound for the static analysis tool, in seconds
tool_timeout_secs = 300

# Per-analyzer overrides
# [analyzers.route-caching]
# enabled = false

# [analyzers.log-level]
# relevant_environments = ["production", "staging"]

# [analyzers.asset-minification]
# paths = ["public/js", "public/css"]

[suppressions]
# Glob patterns for issue locations to ignore
files = ["public/vendor/**"]
"#
    }
}

/// Filter outcomes based on config: drops disabled analyzers and removes
/// issues located in suppressed files.
pub fn apply_suppressions(outcomes: Vec<AnalyzerOutcome>, config: &Config) -> Vec<AnalyzerOutcome> {
    outcomes
        .into_iter()
        .filter(|o| config.is_analyzer_enabled(&o.analyzer.id))
        .map(|o| AnalyzerOutcome {
            result: o.result.without_issues(|issue| {
                issue
                    .location()
                    .is_some_and(|loc| config.is_file_excluded(&loc.file))
            }),
            analyzer: o.analyzer,
        })
        .collect()
}
