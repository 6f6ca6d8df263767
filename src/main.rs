use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tonecoach::cli::{Cli, Command, CompareArgs, LiveArgs, TraceArgs};
use tonecoach::config::AppConfig;
use tonecoach::source::live::{BackendClient, LiveSource};
use tonecoach::source::phrases::PhraseDeck;
use tonecoach::source::read_analysis;
use tonecoach::trace::PitchTrace;
use tonecoach::ui::launch_ui;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Trace(args) => handle_trace(&args),
        Command::Compare(args) => handle_compare(&args),
        Command::Live(args) => handle_live(&args),
    }
}

fn handle_trace(args: &TraceArgs) -> Result<()> {
    let analysis = read_analysis(&args.input)?;
    let trace = PitchTrace::from_analysis(&analysis);
    let report = trace.report(args.track);
    let json = serde_json::to_string_pretty(&report).context("failed to serialize trace")?;
    println!("{}", json);
    Ok(())
}

fn handle_compare(args: &CompareArgs) -> Result<()> {
    launch_ui(Box::new(args.fixture_source()))
}

fn handle_live(args: &LiveArgs) -> Result<()> {
    anyhow::ensure!(
        args.learner_audio.is_file(),
        "recording does not exist: {:?}",
        args.learner_audio
    );
    let config = AppConfig::from_overrides(args.backend_url.clone(), args.cache_dir.clone())?;
    let client = BackendClient::new(&config.backend_url)?;

    let count = client.phrase_count()?;
    let deck = PhraseDeck::starting_at(count, args.phrase_index)
        .context("backend phrase deck is empty")?;
    info!(backend = %config.backend_url, count, "connected to backend");

    let mut source = LiveSource::new(
        client,
        deck,
        args.learner_audio.clone(),
        config.cache_dir,
    );
    source.fetch_phrase()?;
    launch_ui(Box::new(source))
}
