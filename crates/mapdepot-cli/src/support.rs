use crate::cli::BuildOpts;
use mapdepot_maptools::MaptoolsClient;
use mapdepot_pipeline::{BuildRun, OutcomeKind, PipelineConfig};
use mapdepot_scan::load_repos_config;
use mapdepot_store::PublicUrls;
use serde_json::Value;
use std::path::Path;

pub fn read_json_or_exit(path: &Path) -> Value {
    let bytes = std::fs::read(path).unwrap_or_else(|e| {
        eprintln!("error: unable to read {}: {e}", path.display());
        std::process::exit(1);
    });
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        eprintln!("error: {} is not valid JSON: {e}", path.display());
        std::process::exit(1);
    })
}

pub fn pipeline_config_or_exit(opts: &BuildOpts) -> PipelineConfig {
    let repos = load_repos_config(&read_json_or_exit(&opts.repos_config)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let urls = PublicUrls::from_config(
        &read_json_or_exit(&opts.urls_config),
        &opts.data_root_relurl,
    )
    .unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    PipelineConfig {
        repos,
        urls,
        data_root: opts.data_root.clone(),
        assets_root: opts.assets_root.clone(),
        page_capacity: opts.page_capacity,
        workers: opts.workers,
    }
}

pub fn maptools_or_exit(exe: Option<&Path>) -> MaptoolsClient {
    let client = match exe {
        Some(path) => MaptoolsClient::with_executable(path),
        None => MaptoolsClient::new(),
    };
    if !client.is_available() {
        eprintln!("error: maptools executable not found");
        std::process::exit(1);
    }
    client
}

/// Exit code for an `update` run. A run with no new maps still exits 0;
/// only rejections under `--strict` (PR-check mode) are failures.
pub fn update_exit_code(report: &BuildRun, strict: bool) -> i32 {
    if strict && report.counts.rejected > 0 {
        2
    } else {
        0
    }
}

pub fn print_run_report(report: &BuildRun, json_output: bool) {
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(report).expect("json serialization")
        );
        return;
    }

    println!("mapdepot {} run {}", report.mode, report.run_id);
    println!("  Repos: {}", report.repos.join(", "));
    println!(
        "  Scanned: {}  Accepted: {}  Rejected: {}  Skipped: {}  Superseded: {}",
        report.counts.scanned,
        report.counts.accepted,
        report.counts.rejected,
        report.counts.skipped,
        report.counts.superseded
    );
    println!("  Changed: {}", if report.changed { "yes" } else { "no" });
    for outcome in &report.outcomes {
        match &outcome.kind {
            OutcomeKind::Accepted {
                content_hash,
                warnings,
            } => {
                println!("  + {}:{} ({content_hash})", outcome.repo_id, outcome.path);
                for warning in warnings {
                    println!("      warning: {warning}");
                }
            }
            OutcomeKind::Rejected { category, detail } => {
                println!(
                    "  ! {}:{} [{category}] {detail}",
                    outcome.repo_id, outcome.path
                );
            }
            OutcomeKind::Skipped { reason } => {
                println!("  - {}:{} ({reason})", outcome.repo_id, outcome.path);
            }
        }
    }
}
