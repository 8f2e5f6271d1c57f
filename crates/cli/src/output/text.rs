use anyhow::Result;
use colored::{ColoredString, Colorize};
use laravel_guard::report::AnalysisReport;
use laravel_guard::result::{Severity, Status};

fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Passed => "PASS".green().bold(),
        Status::Warning => "WARN".yellow().bold(),
        Status::Failed => "FAIL".red().bold(),
        Status::Error => "ERROR".magenta().bold(),
        Status::Skipped => "SKIP".dimmed(),
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::High => "HIGH".red(),
        Severity::Medium => "MEDIUM".yellow(),
        Severity::Low => "LOW".blue(),
    }
}

pub fn print(report: &AnalysisReport, quiet: bool, no_color: bool) -> Result<()> {
    if no_color {
        colored::control::set_override(false);
    }

    if !quiet {
        println!();
        println!("{}", "  laravel-guard - Laravel Project Analysis".bold());
        println!("  Project:     {}", report.project.display());
        println!("  Environment: {}", report.environment);
        println!();
    }

    for outcome in &report.outcomes {
        let result = &outcome.result;
        if quiet && matches!(result.status(), Status::Passed | Status::Skipped) {
            continue;
        }

        println!(
            "  [{}] {} ({})",
            status_label(result.status()),
            outcome.analyzer.name,
            outcome.analyzer.id
        );
        println!("    {}", result.message().dimmed());

        for issue in result.issues() {
            println!(
                "    {} [{}] {}",
                "-".dimmed(),
                severity_label(issue.severity()),
                issue.message()
            );
            if let Some(location) = issue.location() {
                println!("      {} {}", "-->".dimmed(), location);
            }
            if !issue.recommendation().is_empty() {
                println!("      {} {}", "Fix:".green(), issue.recommendation());
            }
        }
        println!();
    }

    if !quiet {
        let statuses = &report.results_by_status;
        println!("{}", "  Summary".bold().underline());
        println!("    Passed:   {}", statuses.passed);
        println!("    Warnings: {}", statuses.warning);
        println!("    Failed:   {}", statuses.failed);
        println!("    Errors:   {}", statuses.error);
        println!("    Skipped:  {}", statuses.skipped);
        println!("    Issues:   {}", report.total_issues);
        println!();
    }

    Ok(())
}
