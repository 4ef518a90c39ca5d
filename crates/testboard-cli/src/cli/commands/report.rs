use chrono::Utc;
use testboard_core::report::console::render_console;
use testboard_core::report::json::{to_json_string, write_json};
use testboard_core::{
    load_store, BoardError, CachedSource, FileSource, QueryCache, ReportAssembler, ReportConfig,
};

use crate::cli::args::{OutputFormat, ReportArgs};
use crate::exit_codes::SUCCESS;

pub fn run(args: ReportArgs) -> anyhow::Result<i32> {
    let config = match &args.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    let mut options = config.options();
    if let Some(limit) = args.job_limit {
        options = options.with_job_limit(limit);
    }
    if let Some(limit) = args.test_limit {
        options = options.with_test_limit(limit);
    }

    let cache = QueryCache::new(&args.cache_dir, &args.schema)?;
    let source = CachedSource::new(FileSource::new(&args.records), cache, args.use_cache);
    let store = load_store(&source, &args.query)?;

    let report = ReportAssembler::new(&config).report(&store, options, Utc::now())?;
    tracing::info!(
        query = %args.query,
        records = store.len(),
        job_limit = options.job_limit,
        test_limit = options.test_limit,
        "report assembled"
    );

    match (&args.format, &args.out) {
        (OutputFormat::Json, Some(out)) => write_json(&report, out)?,
        (OutputFormat::Json, None) => println!("{}", to_json_string(&report)?),
        (OutputFormat::Console, Some(out)) => {
            std::fs::write(out, render_console(&report)).map_err(|source| BoardError::Io {
                path: out.clone(),
                source,
            })?
        }
        (OutputFormat::Console, None) => print!("{}", render_console(&report)),
    }
    if let Some(out) = &args.out {
        tracing::info!(path = %out.display(), "report written");
    }
    Ok(SUCCESS)
}
