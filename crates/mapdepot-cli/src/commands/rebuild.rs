use crate::cli::BuildOpts;
use crate::support::{maptools_or_exit, pipeline_config_or_exit, print_run_report};
use mapdepot_pipeline::{RunMode, run};
use mapdepot_scan::LocalRepoSource;

pub fn run_rebuild(opts: BuildOpts) {
    let config = pipeline_config_or_exit(&opts);
    let source = LocalRepoSource::new(&opts.source_root);
    let analyzer = maptools_or_exit(opts.maptools.as_deref());

    let report = match run(&config, &source, &analyzer, RunMode::Full) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    print_run_report(&report, opts.json);
}
