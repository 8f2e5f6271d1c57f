use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use laravel_guard::analyzer::*;
use laravel_guard::manifest::BuildManifest;
use laravel_guard::result::*;
use walkdir::WalkDir;

const DEFAULT_PATHS: &[&str] = &["public/js", "public/css", "public/build/assets"];

/// Minified bundles are a handful of very long lines; anything with more
/// significant lines than this is treated as unminified.
const MAX_MINIFIED_LINES: usize = 5;

/// Detects compiled JavaScript and CSS served without minification.
pub struct AssetMinification {
    metadata: AnalyzerMetadata,
    environments: RelevantEnvironments,
    paths: Vec<PathBuf>,
}

impl AssetMinification {
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new(
                "asset-minification",
                "Compiled assets are minified",
                Category::Performance,
                Severity::Medium,
                &["assets", "frontend", "performance"],
            ),
            environments: RelevantEnvironments::production(),
            paths: DEFAULT_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Project-relative asset files under the configured paths
    fn asset_files(&self, ctx: &AnalysisContext) -> BTreeSet<PathBuf> {
        self.paths
            .iter()
            .flat_map(|dir| WalkDir::new(ctx.path(dir)).into_iter().filter_map(Result::ok))
            .filter(|entry| entry.file_type().is_file() && is_asset(entry.path()))
            .map(|entry| ctx.relative(entry.path()).to_path_buf())
            .collect()
    }
}

impl Default for AssetMinification {
    fn default() -> Self {
        Self::new()
    }
}

fn is_asset(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("js") | Some("css")
    )
}

fn has_min_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains(".min."))
}

fn is_source_map_marker(line: &str) -> bool {
    let line = line.trim_start();
    ["//# sourceMappingURL=", "//@ sourceMappingURL=", "/*# sourceMappingURL="]
        .iter()
        .any(|marker| line.starts_with(marker))
}

/// Non-blank lines, ignoring trailing source map comments
fn significant_lines(content: &str) -> usize {
    content
        .lines()
        .filter(|l| !l.trim().is_empty() && !is_source_map_marker(l))
        .count()
}

impl Analyzer for AssetMinification {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }

    fn skip_reason(&self, ctx: &AnalysisContext) -> Option<String> {
        if let Some(reason) = self.environments.skip_reason(ctx) {
            return Some(reason);
        }
        if self.paths.iter().any(|p| ctx.exists(p)) {
            return None;
        }
        let searched: Vec<String> = self.paths.iter().map(|p| p.display().to_string()).collect();
        Some(format!("No compiled assets found in {}", searched.join(", ")))
    }

    fn run_in_ci(&self) -> bool {
        false
    }

    fn set_paths(&mut self, paths: Vec<PathBuf>) {
        self.paths = paths;
    }

    fn relevant_environments(&self) -> Option<&RelevantEnvironments> {
        Some(&self.environments)
    }

    fn set_relevant_environments(&mut self, environments: Vec<String>) {
        self.environments.set(environments);
    }

    fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
        let manifest = match BuildManifest::discover(ctx.base_path) {
            Ok(manifest) => manifest,
            Err(err) => return AnalysisResult::error(format!("Could not read build manifest: {err}")),
        };

        let mut checked = 0;
        let mut issues = Vec::new();
        for file in self.asset_files(ctx) {
            if manifest.as_ref().is_some_and(|m| !m.contains(&file)) {
                continue;
            }
            checked += 1;
            if has_min_suffix(&file) {
                continue;
            }
            let content = match ctx.read_lossy(&file) {
                Ok(content) => content,
                Err(err) => {
                    return AnalysisResult::error(format!(
                        "Could not read {}: {err}",
                        file.display()
                    ))
                }
            };
            let lines = significant_lines(&content);
            if lines <= MAX_MINIFIED_LINES {
                continue;
            }
            issues.push(
                Issue::new(
                    format!("{} does not appear to be minified.", file.display()),
                    self.metadata.severity,
                    "Build assets for production with minification enabled \
                     (`npm run build` for Vite, `npm run production` for Mix).",
                )
                .at(Location::file(&file))
                .with_meta("line_count", lines)
                .with_meta(
                    "manifest",
                    manifest.as_ref().map_or("none".to_string(), |m| m.kind.to_string()),
                ),
            );
        }

        AnalysisResult::from_issues(
            IssueStatus::Warning,
            format!("All {checked} compiled asset(s) are minified."),
            format!("{} of {checked} compiled asset(s) are not minified.", issues.len()),
            issues,
        )
    }
}
