pub mod app_debug;
pub mod asset_minification;
pub mod cache_driver;
pub mod config_caching;
pub mod env_outside_config;
pub mod log_level;
pub mod middleware_configuration;
pub mod opcache;
pub mod queue_driver;
pub mod route_caching;

use laravel_guard::analyzer::Analyzer;
use laravel_guard::probe::{CapabilityDetector, PhpRuntime};
use laravel_guard::static_analysis::StaticAnalyzer;

/// Returns all built-in analyzers. Optional capabilities are resolved here,
/// once, so analyzers never probe the project themselves.
pub fn all_analyzers(
    capabilities: &dyn CapabilityDetector,
    runtime: PhpRuntime,
    tool: Box<dyn StaticAnalyzer>,
) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(app_debug::AppDebug::new()),
        Box::new(queue_driver::QueueDriver::new()),
        Box::new(cache_driver::CacheDriver::new()),
        Box::new(log_level::LogLevel::new()),
        Box::new(opcache::Opcache::new(runtime)),
        Box::new(config_caching::ConfigCaching::new()),
        Box::new(route_caching::RouteCaching::new()),
        Box::new(asset_minification::AssetMinification::new()),
        Box::new(middleware_configuration::MiddlewareConfiguration::new()),
        Box::new(env_outside_config::EnvOutsideConfig::detect(tool, capabilities)),
    ]
}
