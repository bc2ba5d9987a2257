use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use windscan::cli::{Command, FetchArgs, RootArgs, RunArgs, SubmitArgs};
use windscan::{
    fetch_artifact, load_config, retrieve_artifact, submit_job_with_config, ClientConfig, JobId,
    RetrievedArtifact,
};

#[derive(Serialize)]
struct Summary<'a> {
    job_id: &'a JobId,
    results_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact: Option<&'a RetrievedArtifact>,
}

fn main() -> Result<()> {
    let cli = RootArgs::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
        config.validate()?;
    }

    match cli.command {
        Command::Submit(args) => cmd_submit(&config, args, cli.json),
        Command::Run(args) => cmd_run(config, args, cli.json),
        Command::Fetch(args) => cmd_fetch(config, args, cli.json),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "windscan=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_submit(config: &ClientConfig, args: SubmitArgs, json: bool) -> Result<()> {
    let params = args.job.to_parameters();
    let submission = submit_job_with_config(&params, config).context("submit job")?;
    report(config, &submission.job_id, None, json)
}

fn cmd_run(mut config: ClientConfig, args: RunArgs, json: bool) -> Result<()> {
    if let Some(delay) = args.delay {
        config.retrieval_delay_secs = delay;
    }
    let params = args.job.to_parameters();
    let mut submission = submit_job_with_config(&params, &config).context("submit job")?;
    let destination = destination_for(&submission.job_id, args.out);
    let artifact = retrieve_artifact(
        &submission.job_id,
        &mut submission.session,
        &destination,
        config.retrieval_delay(),
    )
    .with_context(|| format!("download results for job {}", submission.job_id))?;
    report(&config, &submission.job_id, Some(&artifact), json)
}

fn cmd_fetch(mut config: ClientConfig, args: FetchArgs, json: bool) -> Result<()> {
    let job_id = JobId::parse(&args.job_id)
        .ok_or_else(|| anyhow!("job id must be numeric, got {:?}", args.job_id))?;
    config.retrieval_delay_secs = args.delay;
    let destination = destination_for(&job_id, args.out);
    let artifact = fetch_artifact(&job_id, &config, &destination)
        .with_context(|| format!("download results for job {job_id}"))?;
    report(&config, &job_id, Some(&artifact), json)
}

fn destination_for(job_id: &JobId, out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| PathBuf::from(job_id.artifact_file_name()))
}

fn report(
    config: &ClientConfig,
    job_id: &JobId,
    artifact: Option<&RetrievedArtifact>,
    json: bool,
) -> Result<()> {
    let summary = Summary {
        job_id,
        results_url: job_id.results_url(&config.base_url),
        artifact,
    };
    if json {
        let text = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{text}");
        return Ok(());
    }
    println!("Job ID: {}", summary.job_id);
    println!("Results page: {}", summary.results_url);
    if let Some(artifact) = summary.artifact {
        println!(
            "Downloaded {} bytes to {}",
            artifact.bytes,
            artifact.path.display()
        );
    }
    Ok(())
}
