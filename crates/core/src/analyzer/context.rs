use std::path::{Path, PathBuf};

use crate::repository::ConfigRepository;

/// Provides analyzers with the project location, resolved configuration and
/// run-wide flags.
pub struct AnalysisContext<'a> {
    pub base_path: &'a Path,
    pub environment: &'a str,
    pub config: &'a ConfigRepository,
    /// Running non-interactively in CI
    pub ci: bool,
    /// Environment-specific analyzers were disabled by configuration
    pub skip_env_specific: bool,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(base_path: &'a Path, environment: &'a str, config: &'a ConfigRepository) -> Self {
        Self {
            base_path,
            environment,
            config,
            ci: false,
            skip_env_specific: false,
        }
    }

    pub fn with_ci(mut self, ci: bool) -> Self {
        self.ci = ci;
        self
    }

    pub fn with_skip_env_specific(mut self, skip: bool) -> Self {
        self.skip_env_specific = skip;
        self
    }

    /// Absolute path of a project-relative path
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base_path.join(relative)
    }

    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.path(relative).exists()
    }

    /// Contents of a project file, or `None` if it is missing or unreadable
    pub fn read_file(&self, relative: impl AsRef<Path>) -> Option<String> {
        let path = self.path(relative);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "could not read project file");
                None
            }
        }
    }

    /// Contents of a project file with invalid UTF-8 replaced. Read failures
    /// are returned to the caller.
    pub fn read_lossy(&self, relative: impl AsRef<Path>) -> std::io::Result<String> {
        let bytes = std::fs::read(self.path(relative))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Project-relative form of `path`, falling back to `path` itself
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.base_path).unwrap_or(path)
    }
}

/// Allowlist of deployment environments an analyzer applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantEnvironments(Vec<String>);

impl RelevantEnvironments {
    pub fn new(environments: &[&str]) -> Self {
        Self(environments.iter().map(|e| e.to_string()).collect())
    }

    pub fn production() -> Self {
        Self::new(&["production"])
    }

    pub fn set(&mut self, environments: Vec<String>) {
        self.0 = environments;
    }

    pub fn contains(&self, environment: &str) -> bool {
        self.0.iter().any(|e| e.eq_ignore_ascii_case(environment))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn skip_reason(&self, ctx: &AnalysisContext) -> Option<String> {
        if ctx.skip_env_specific {
            return Some(
                "Environment-specific analyzers are disabled by skip_env_specific".to_string(),
            );
        }
        if self.contains(ctx.environment) {
            return None;
        }
        Some(format!(
            "Only relevant in the {} environment(s); current environment is '{}'",
            self.0.join(", "),
            ctx.environment
        ))
    }
}
