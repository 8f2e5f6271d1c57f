//! Integration with an external PHP static analyzer (PHPStan / Larastan).
//!
//! The tool is a black box: it runs against the project root and produces
//! `{path, line, message}` findings that analyzers re-wrap as issues.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("static analysis tool not found at {0}")]
    NotInstalled(PathBuf),
    #[error("failed to run static analysis tool: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("static analysis tool timed out after {0:?}")]
    Timeout(Duration),
    #[error("static analysis tool produced unreadable output: {0}")]
    Output(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFinding {
    pub path: PathBuf,
    pub line: Option<usize>,
    pub message: String,
}

/// All findings from one tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolReport {
    findings: Vec<ToolFinding>,
}

impl ToolReport {
    pub fn new(findings: Vec<ToolFinding>) -> Self {
        Self { findings }
    }

    /// Findings whose message contains `search_term`
    pub fn parse_analysis(&self, search_term: &str) -> Vec<ToolFinding> {
        self.findings
            .iter()
            .filter(|f| f.message.contains(search_term))
            .cloned()
            .collect()
    }

    pub fn findings(&self) -> &[ToolFinding] {
        &self.findings
    }
}

pub trait StaticAnalyzer: Send + Sync {
    /// Analyze the project rooted at `root`
    fn run(&self, root: &Path) -> Result<ToolReport, ToolError>;
}

#[derive(Deserialize)]
struct PhpStanOutput {
    #[serde(default)]
    files: BTreeMap<String, PhpStanFile>,
}

#[derive(Deserialize)]
struct PhpStanFile {
    #[serde(default)]
    messages: Vec<PhpStanMessage>,
}

#[derive(Deserialize)]
struct PhpStanMessage {
    message: String,
    line: Option<usize>,
}

/// Parse PHPStan's `--error-format=json` output. PHP notices printed before
/// or after the JSON document are ignored.
pub fn parse_phpstan_json(output: &str, root: &Path) -> Result<ToolReport, ToolError> {
    let no_document = || ToolError::Output("no JSON document in output".to_string());
    let start = output.find('{').ok_or_else(no_document)?;
    let parsed: PhpStanOutput = serde_json::Deserializer::from_str(&output[start..])
        .into_iter::<PhpStanOutput>()
        .next()
        .ok_or_else(no_document)?
        .map_err(|e| ToolError::Output(e.to_string()))?;

    let findings = parsed
        .files
        .into_iter()
        .flat_map(|(file, entry)| {
            let path = Path::new(&file);
            let path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            entry.messages.into_iter().map(move |m| ToolFinding {
                path: path.clone(),
                line: m.line,
                message: m.message,
            })
        })
        .collect();
    Ok(ToolReport::new(findings))
}

/// Runs `vendor/bin/phpstan analyse` in the project, killing it once the
/// timeout elapses.
#[derive(Debug, Clone)]
pub struct PhpStan {
    binary: PathBuf,
    timeout: Duration,
}

impl PhpStan {
    pub fn new(timeout: Duration) -> Self {
        Self {
            binary: PathBuf::from("vendor/bin/phpstan"),
            timeout,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl StaticAnalyzer for PhpStan {
    fn run(&self, root: &Path) -> Result<ToolReport, ToolError> {
        let binary = root.join(&self.binary);
        if !binary.exists() {
            return Err(ToolError::NotInstalled(binary));
        }

        tracing::info!(binary = %binary.display(), "running static analysis");
        let mut child = Command::new(&binary)
            .args(["analyse", "--error-format=json", "--no-progress", "--no-interaction"])
            .current_dir(root)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        // Drain stdout on a separate thread so a full pipe can't stall the child.
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::Output("stdout was not captured".to_string()))?;
        let reader = thread::spawn(move || {
            let mut buf = String::new();
            stdout.read_to_string(&mut buf).map(|_| buf)
        });

        let deadline = Instant::now() + self.timeout;
        loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(timeout = ?self.timeout, "static analysis timed out, killing it");
                child.kill()?;
                child.wait()?;
                return Err(ToolError::Timeout(self.timeout));
            }
            thread::sleep(Duration::from_millis(50));
        }

        // PHPStan exits non-zero when it reports errors, so the status is not checked.
        let output = reader
            .join()
            .map_err(|_| ToolError::Output("reader thread panicked".to_string()))??;
        parse_phpstan_json(&output, root)
    }
}
