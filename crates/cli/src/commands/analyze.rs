use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;

use laravel_guard::analyzer::{AnalysisContext, AnalyzerRegistry};
use laravel_guard::config::{self, Config};
use laravel_guard::probe::{ComposerPackages, PhpRuntime};
use laravel_guard::report::AnalysisReport;
use laravel_guard::repository::ConfigRepository;
use laravel_guard::static_analysis::PhpStan;

use crate::output;
use crate::OutputFormat;

pub struct Options {
    pub path: PathBuf,
    pub env: Option<String>,
    pub config_dump: Option<PathBuf>,
    pub php_info: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub analyzers: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub config: Option<PathBuf>,
    pub ci: bool,
    pub strict: bool,
    pub quiet: bool,
    pub no_color: bool,
}

pub fn run(opts: Options) -> Result<()> {
    let base = opts
        .path
        .canonicalize()
        .with_context(|| format!("Project not found: {}", opts.path.display()))?;

    // 1. Load tool config and the application's resolved configuration
    let config_path = opts
        .config
        .unwrap_or_else(|| base.join(".laravel-guard.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let dump_path = opts
        .config_dump
        .unwrap_or_else(|| base.join(".laravel-guard/config.json"));
    let repository = ConfigRepository::load(&dump_path)?;

    let environment = opts
        .env
        .or_else(|| repository.get_str("app.env").map(str::to_string))
        .or_else(|| config.global.environment.clone())
        .unwrap_or_else(|| "production".to_string());

    // 2. Resolve optional capabilities once
    let runtime = match &opts.php_info {
        Some(path) => {
            let info = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            PhpRuntime::from_phpinfo(&info)
        }
        None if opts.ci => PhpRuntime::default(),
        None => PhpRuntime::detect().unwrap_or_else(|err| {
            tracing::warn!(%err, "PHP runtime could not be inspected");
            PhpRuntime::default()
        }),
    };
    let packages = ComposerPackages::load(&base).unwrap_or_else(|err| {
        tracing::warn!(%err, "installed packages could not be read");
        ComposerPackages::default()
    });
    let tool = PhpStan::new(Duration::from_secs(config.global.tool_timeout_secs));

    // 3. Build analyzer registry
    let mut all = laravel_guard_analyzers::all_analyzers(&packages, runtime, Box::new(tool));

    if let Some(ref ids) = opts.analyzers {
        all.retain(|a| ids.iter().any(|id| *id == a.metadata().id));
    }
    if let Some(ref ids) = opts.exclude {
        all.retain(|a| !ids.iter().any(|id| *id == a.metadata().id));
    }
    all.retain(|a| config.is_analyzer_enabled(&a.metadata().id));

    for analyzer in &mut all {
        let Some(overrides) = config.analyzer(&analyzer.metadata().id) else {
            continue;
        };
        if let Some(envs) = &overrides.relevant_environments {
            if analyzer.relevant_environments().is_none() {
                tracing::warn!(
                    analyzer = %analyzer.metadata().id,
                    "relevant_environments ignored: analyzer runs in every environment"
                );
            }
            analyzer.set_relevant_environments(envs.clone());
        }
        if let Some(paths) = &overrides.paths {
            analyzer.set_paths(paths.clone());
        }
    }

    let mut registry = AnalyzerRegistry::new();
    registry.register_all(all);

    if !opts.quiet {
        eprintln!(
            "Analyzing {} ({} environment) with {} analyzers...",
            base.display(),
            environment,
            registry.len()
        );
    }

    // 4. Run and apply suppressions
    let ctx = AnalysisContext::new(&base, &environment, &repository)
        .with_ci(opts.ci)
        .with_skip_env_specific(config.global.skip_env_specific);
    let outcomes = config::apply_suppressions(registry.run_all(&ctx), &config);

    // 5. Build report
    let report = AnalysisReport::from_outcomes(base.clone(), environment.clone(), outcomes);

    // 6. Output
    let format = match opts.format {
        Some(format) => format,
        None => OutputFormat::from_str(&config.global.output_format, true)
            .map_err(|e| anyhow::anyhow!("Invalid output_format in config: {e}"))?,
    };
    match format {
        OutputFormat::Json => output::json::print(&report)?,
        OutputFormat::Sarif => output::sarif::print(&report)?,
        OutputFormat::Text => output::text::print(&report, opts.quiet, opts.no_color)?,
    }

    // 7. Exit code
    if report.has_failures(opts.strict) {
        std::process::exit(1);
    }

    Ok(())
}
