use std::time::Duration;

use anyhow::Result;
use laravel_guard::probe::{ComposerPackages, PhpRuntime};
use laravel_guard::static_analysis::PhpStan;

pub fn run() -> Result<()> {
    let analyzers = laravel_guard_analyzers::all_analyzers(
        &ComposerPackages::default(),
        PhpRuntime::default(),
        Box::new(PhpStan::new(Duration::from_secs(300))),
    );

    println!(
        "{:<26} {:<12} {:<10} {:<4} Name",
        "Id", "Category", "Severity", "CI"
    );
    println!("{}", "-".repeat(90));

    for a in &analyzers {
        let meta = a.metadata();
        println!(
            "{:<26} {:<12} {:<10} {:<4} {}",
            meta.id,
            meta.category.to_string(),
            meta.severity.to_string(),
            if a.run_in_ci() { "yes" } else { "no" },
            meta.name
        );
    }

    println!("\nTotal: {} analyzers", analyzers.len());
    Ok(())
}
