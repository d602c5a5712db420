use crate::cli::BuildOpts;
use crate::support::{maptools_or_exit, pipeline_config_or_exit, print_run_report, update_exit_code};
use mapdepot_pipeline::{RunMode, run};
use mapdepot_scan::LocalRepoSource;

pub fn run_update(opts: BuildOpts, strict: bool) {
    let config = pipeline_config_or_exit(&opts);
    let source = LocalRepoSource::new(&opts.source_root);
    let analyzer = maptools_or_exit(opts.maptools.as_deref());

    let report = match run(&config, &source, &analyzer, RunMode::Incremental) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    print_run_report(&report, opts.json);
    let code = update_exit_code(&report, strict);
    if code != 0 {
        std::process::exit(code);
    }
}
