use crate::support::maptools_or_exit;
use mapdepot_kernel::identity;
use mapdepot_kernel::{MapAnalyzer, ValidationContext, ValidationFailure, build_record};
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};

pub fn run_validate(
    packages: Vec<PathBuf>,
    expected_players: u8,
    maptools: Option<PathBuf>,
    json_output: bool,
) {
    let analyzer = maptools_or_exit(maptools.as_deref());

    let mut verdicts = Vec::new();
    let mut rejected = 0usize;
    for package in &packages {
        match validate_one(&analyzer, package, expected_players) {
            Ok((name, warnings)) => verdicts.push(json!({
                "package": package.display().to_string(),
                "status": "accepted",
                "name": name,
                "warnings": warnings,
            })),
            Err(failure) => {
                rejected += 1;
                verdicts.push(json!({
                    "package": package.display().to_string(),
                    "status": "rejected",
                    "category": failure.category(),
                    "detail": failure.to_string(),
                }));
            }
        }
    }

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&verdicts).expect("json serialization")
        );
    } else {
        for verdict in &verdicts {
            if verdict["status"] == "accepted" {
                println!("accepted: {} ({})", verdict["package"], verdict["name"]);
                for warning in verdict["warnings"].as_array().into_iter().flatten() {
                    println!("  warning: {warning}");
                }
            } else {
                println!(
                    "rejected: {} [{}] {}",
                    verdict["package"], verdict["category"], verdict["detail"]
                );
            }
        }
        println!(
            "{} of {} package(s) accepted",
            verdicts.len() - rejected,
            verdicts.len()
        );
    }

    if rejected > 0 {
        std::process::exit(2);
    }
}

fn validate_one(
    analyzer: &dyn MapAnalyzer,
    package: &Path,
    expected_players: u8,
) -> Result<(String, Vec<String>), ValidationFailure> {
    let file = File::open(package)
        .map_err(|e| ValidationFailure::MalformedPackage(format!("unable to open package: {e}")))?;
    let (hash, byte_size) = identity::identify_reader(file)
        .map_err(|e| ValidationFailure::MalformedPackage(format!("unable to read package: {e}")))?;

    let analysis = analyzer.analyze(package)?;
    let ctx = ValidationContext {
        repo_id: "adhoc".to_string(),
        path: package
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        expected_players,
        uploaded_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
    };
    let validated = build_record(&analysis, &ctx, hash, byte_size)?;
    Ok((validated.record.name, validated.warnings))
}
