use std::fs;
use std::path::Path;

use laravel_guard::analyzer::{AnalysisContext, AnalyzerOutcome, AnalyzerRegistry};
use laravel_guard::config::{self, Config};
use laravel_guard::probe::{CapabilityDetector, ComposerPackages, PhpRuntime};
use laravel_guard::report::AnalysisReport;
use laravel_guard::repository::ConfigRepository;
use laravel_guard::result::{Severity, Status};
use laravel_guard::static_analysis::{StaticAnalyzer, ToolError, ToolFinding, ToolReport};
use laravel_guard_analyzers::all_analyzers;

struct FakePhpStan(Vec<ToolFinding>);

impl StaticAnalyzer for FakePhpStan {
    fn run(&self, _root: &Path) -> Result<ToolReport, ToolError> {
        Ok(ToolReport::new(self.0.clone()))
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn run(
    root: &Path,
    config_json: &str,
    runtime: PhpRuntime,
    capabilities: &dyn CapabilityDetector,
    ci: bool,
) -> Vec<AnalyzerOutcome> {
    let repository = ConfigRepository::from_json_str(config_json).unwrap();
    let environment = repository.get_str("app.env").unwrap().to_string();

    let mut registry = AnalyzerRegistry::new();
    registry.register_all(all_analyzers(
        capabilities,
        runtime,
        Box::new(FakePhpStan(vec![])),
    ));

    let ctx = AnalysisContext::new(root, &environment, &repository).with_ci(ci);
    registry.run_all(&ctx)
}

fn status_of(outcomes: &[AnalyzerOutcome], id: &str) -> Status {
    outcomes
        .iter()
        .find(|o| o.analyzer.id == id)
        .unwrap_or_else(|| panic!("{id} did not run"))
        .result
        .status()
}

#[test]
fn test_unsafe_project_has_issues() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = PhpRuntime::from_phpinfo(include_str!("fixtures/phpinfo.txt"));
    let outcomes = run(
        dir.path(),
        include_str!("fixtures/unsafe_config.json"),
        runtime,
        &ComposerPackages::default(),
        false,
    );

    assert_eq!(outcomes.len(), 10);
    assert_eq!(status_of(&outcomes, "app-debug"), Status::Failed);
    assert_eq!(status_of(&outcomes, "queue-driver"), Status::Warning);
    assert_eq!(status_of(&outcomes, "cache-driver"), Status::Failed);
    assert_eq!(status_of(&outcomes, "log-level"), Status::Warning);
    assert_eq!(status_of(&outcomes, "opcache"), Status::Warning);
    assert_eq!(status_of(&outcomes, "config-caching"), Status::Warning);
    assert_eq!(status_of(&outcomes, "route-caching"), Status::Warning);
    assert_eq!(status_of(&outcomes, "asset-minification"), Status::Skipped);
    assert_eq!(status_of(&outcomes, "middleware-configuration"), Status::Skipped);
    assert_eq!(status_of(&outcomes, "env-outside-config"), Status::Skipped);

    let report = AnalysisReport::from_outcomes(dir.path().to_path_buf(), "production", outcomes);
    assert_eq!(report.results_by_status.failed, 2);
    assert_eq!(report.results_by_status.skipped, 3);
    assert_eq!(report.issues_by_severity.critical, 2);
    assert!(report.has_failures(false));
}

#[test]
fn test_every_failing_result_carries_issues() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = PhpRuntime::from_phpinfo(include_str!("fixtures/phpinfo.txt"));
    let outcomes = run(
        dir.path(),
        include_str!("fixtures/unsafe_config.json"),
        runtime,
        &ComposerPackages::default(),
        false,
    );

    for outcome in &outcomes {
        let result = &outcome.result;
        match result.status() {
            Status::Warning | Status::Failed => assert!(
                !result.issues().is_empty(),
                "{} has no issues",
                outcome.analyzer.id
            ),
            _ => assert!(result.issues().is_empty()),
        }
    }
}

#[test]
fn test_safe_project_passes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "bootstrap/cache/config.php", "<?php return [];");
    write(root, "bootstrap/cache/routes-v7.php", "<?php");
    write(
        root,
        "public/build/manifest.json",
        r#"{"resources/js/app.js": {"file": "assets/app-4ed9.js"}}"#,
    );
    write(root, "public/build/assets/app-4ed9.js", "(()=>{console.log(1)})();\n");
    write(
        root,
        "app/Http/Kernel.php",
        "<?php\nclass Kernel\n{\n    protected $middleware = [\n        \\App\\Http\\Middleware\\TrustProxies::class,\n    ];\n}\n",
    );

    let runtime = PhpRuntime::from_phpinfo(
        "Zend OPcache\nopcache.enable => On => On\nopcache.memory_consumption => 256 => 256\n\
         opcache.interned_strings_buffer => 16 => 16\nopcache.max_accelerated_files => 20000 => 20000\n\
         opcache.validate_timestamps => Off => Off\n",
    );
    let packages = ComposerPackages::from_names(["laravel/framework", "larastan/larastan"]);
    let outcomes = run(
        root,
        include_str!("fixtures/safe_config.json"),
        runtime,
        &packages,
        false,
    );

    for outcome in &outcomes {
        assert_eq!(
            outcome.result.status(),
            Status::Passed,
            "{}: {}",
            outcome.analyzer.id,
            outcome.result.message()
        );
    }
}

#[test]
fn test_ci_mode_skips_runtime_analyzers() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = PhpRuntime::from_phpinfo(include_str!("fixtures/phpinfo.txt"));
    let outcomes = run(
        dir.path(),
        include_str!("fixtures/unsafe_config.json"),
        runtime,
        &ComposerPackages::default(),
        true,
    );

    assert_eq!(status_of(&outcomes, "opcache"), Status::Skipped);
    assert_eq!(status_of(&outcomes, "config-caching"), Status::Skipped);
    assert_eq!(status_of(&outcomes, "route-caching"), Status::Skipped);
    assert_eq!(status_of(&outcomes, "app-debug"), Status::Failed);
}

#[test]
fn test_queue_null_driver_issue() {
    let dir = tempfile::tempdir().unwrap();
    let outcomes = run(
        dir.path(),
        include_str!("fixtures/unsafe_config.json"),
        PhpRuntime::default(),
        &ComposerPackages::default(),
        false,
    );
    let queue = outcomes
        .iter()
        .find(|o| o.analyzer.id == "queue-driver")
        .unwrap();
    assert_eq!(queue.result.issues().len(), 1);
    assert_eq!(queue.result.issues()[0].severity(), Severity::Critical);
    assert!(queue.result.issues()[0]
        .recommendation()
        .contains("silently discards"));
}

#[test]
fn test_config_suppresses_and_disables() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "public/vendor/horizon/app.js",
        "a();\nb();\nc();\nd();\ne();\nf();\n",
    );

    let toml_str = r#"
[analyzers.asset-minification]
paths = ["public/vendor"]

[analyzers.route-caching]
enabled = false

[suppressions]
files = ["public/vendor/**"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let repository = ConfigRepository::from_json_str(include_str!("fixtures/safe_config.json")).unwrap();

    let mut analyzers = all_analyzers(
        &ComposerPackages::default(),
        PhpRuntime::default(),
        Box::new(FakePhpStan(vec![])),
    );
    for analyzer in &mut analyzers {
        if let Some(paths) = config
            .analyzer(&analyzer.metadata().id)
            .and_then(|a| a.paths.clone())
        {
            analyzer.set_paths(paths);
        }
    }
    let mut registry = AnalyzerRegistry::new();
    registry.register_all(analyzers);

    let ctx = AnalysisContext::new(dir.path(), "production", &repository);
    let outcomes = registry.run_selected(&["asset-minification", "route-caching"], &ctx);
    assert_eq!(status_of(&outcomes, "asset-minification"), Status::Warning);

    let filtered = config::apply_suppressions(outcomes, &config);
    assert_eq!(filtered.len(), 1);
    assert_eq!(status_of(&filtered, "asset-minification"), Status::Passed);
}

#[test]
fn test_env_outside_config_reports_tool_findings() {
    let dir = tempfile::tempdir().unwrap();
    let repository = ConfigRepository::default();
    let packages = ComposerPackages::from_names(["larastan/larastan"]);
    let tool = FakePhpStan(vec![ToolFinding {
        path: "app/Http/Controllers/HomeController.php".into(),
        line: Some(14),
        message: "Called 'env' outside of the config directory which returns null when the config is cached, use 'config'.".to_string(),
    }]);

    let mut registry = AnalyzerRegistry::new();
    registry.register_all(all_analyzers(&packages, PhpRuntime::default(), Box::new(tool)));
    let ctx = AnalysisContext::new(dir.path(), "production", &repository);
    let outcomes = registry.run_selected(&["env-outside-config"], &ctx);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].result.status(), Status::Failed);
    assert_eq!(
        outcomes[0].result.issues()[0].location().unwrap().line,
        Some(14)
    );
}

#[test]
fn test_skip_env_specific() {
    let dir = tempfile::tempdir().unwrap();
    let repository = ConfigRepository::from_json_str(include_str!("fixtures/unsafe_config.json")).unwrap();
    let mut registry = AnalyzerRegistry::new();
    registry.register_all(all_analyzers(
        &ComposerPackages::default(),
        PhpRuntime::default(),
        Box::new(FakePhpStan(vec![])),
    ));

    let ctx = AnalysisContext::new(dir.path(), "production", &repository).with_skip_env_specific(true);
    let outcomes = registry.run_all(&ctx);
    assert_eq!(status_of(&outcomes, "app-debug"), Status::Skipped);
    assert_eq!(status_of(&outcomes, "queue-driver"), Status::Skipped);
}
