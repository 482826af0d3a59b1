use std::process;

use clap::Parser;

use wider_eval_cli::{build_source, build_uploader, evaluate, load_config, EvalArgs};
use wider_eval_core::shared::config::SourceKind;
use wider_eval_core::sink::domain::result_sink::SinkReport;

/// Time the face detector over the evaluation set and upload the results
/// for scoring.
#[derive(Parser)]
#[command(name = "run-evaluation", version)]
struct Cli {
    #[command(flatten)]
    eval: EvalArgs,

    /// Image source: local, catalog or service.
    #[arg(long)]
    source: Option<SourceKind>,

    /// Job identifier naming the uploaded artifact (default: $JOB_ID).
    #[arg(long)]
    job_id: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.eval)?;
    if let Some(source) = cli.source {
        config.source = source;
    }
    let job_id = config.resolve_job_id(cli.job_id.as_deref())?;
    log::info!("Job {job_id}: {:?} image source", config.source);

    let source = build_source(&config)?;
    let uploader = build_uploader(&config, &job_id)?;

    if let SinkReport::Uploaded(receipt) = evaluate(&config, source, Box::new(uploader))? {
        log::info!("Results uploaded to {}/{}", receipt.bucket, receipt.key);
    }
    Ok(())
}
