use anyhow::Result;
use laravel_guard::report::AnalysisReport;
use laravel_guard::result::{Severity, Status};
use serde_json::json;

/// Print SARIF 2.1.0 output for GitHub Code Scanning integration
pub fn print(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(&to_sarif(report))?;
    println!("{json}");
    Ok(())
}

/// One rule per analyzer that ran; one result per issue, plus one per
/// analyzer that could not complete.
fn to_sarif(report: &AnalysisReport) -> serde_json::Value {
    let rules: Vec<serde_json::Value> = report
        .outcomes
        .iter()
        .filter(|o| o.result.status() != Status::Skipped)
        .map(|o| {
            json!({
                "id": o.analyzer.id,
                "name": o.analyzer.name,
                "shortDescription": { "text": o.analyzer.name },
                "defaultConfiguration": {
                    "level": severity_to_sarif_level(o.analyzer.severity)
                },
                "properties": {
                    "category": o.analyzer.category.to_string(),
                    "tags": o.analyzer.tags
                }
            })
        })
        .collect();

    let mut results: Vec<serde_json::Value> = Vec::new();
    for outcome in &report.outcomes {
        let result = &outcome.result;
        if result.status() == Status::Error {
            results.push(json!({
                "ruleId": outcome.analyzer.id,
                "level": "error",
                "kind": "fail",
                "message": { "text": result.message() }
            }));
            continue;
        }

        for issue in result.issues() {
            let mut entry = json!({
                "ruleId": outcome.analyzer.id,
                "level": severity_to_sarif_level(issue.severity()),
                "message": {
                    "text": format!("{} {}", issue.message(), issue.recommendation())
                },
                "properties": issue.metadata()
            });

            if let Some(location) = issue.location() {
                let mut physical = json!({
                    "artifactLocation": {
                        "uri": location.file.display().to_string()
                    }
                });
                if let Some(line) = location.line {
                    physical["region"] = json!({ "startLine": line });
                }
                entry["locations"] = json!([{ "physicalLocation": physical }]);
            }

            results.push(entry);
        }
    }

    json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "laravel-guard",
                    "version": env!("CARGO_PKG_VERSION"),
                    "informationUri": "https://github.com/safestackai/laravel-guard",
                    "rules": rules
                }
            },
            "results": results
        }]
    })
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}
