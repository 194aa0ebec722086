//! reposum: summarize a GitHub repository with an LLM.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages; pipeline
//! failures are rendered in the uniform `{kind, message}` shape.

mod cli;

use reposum::config;
use reposum::constants;
use reposum::env;
use reposum::github;
use reposum::orchestrator;
use reposum::providers;
use reposum::ranker;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cli::args::{Cli, Command, RankArgs, SummarizeArgs};
use config::Config;
use env::Env;
use github::{GithubClient, TreeProvider, parse_repo_url};
use orchestrator::{PipelineError, SummaryPipeline};
use providers::rig::RigProvider;
use ranker::RankLimits;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Summarize(args) => run_summarize(*args).await,
        Command::Rank(args) => run_rank(args).await,
        Command::Version => run_version(),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = match (verbose, quiet) {
        (true, _) => "reposum=debug",
        (_, true) => "warn",
        _ => "reposum=info,warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    Config::load(Some(&cwd), &Env::real()).context("failed to load configuration")
}

/// Render a pipeline failure and exit non-zero.
fn fail(format: cli::args::OutputFormat, err: &PipelineError) -> ! {
    let rendered = format.renderer().render_error(&err.to_response());
    match format {
        cli::args::OutputFormat::Json => println!("{rendered}"),
        cli::args::OutputFormat::Terminal => eprint!("{rendered}"),
    }
    process::exit(1);
}

async fn run_summarize(args: SummarizeArgs) -> Result<()> {
    let repo = match parse_repo_url(&args.url) {
        Ok(repo) => repo,
        Err(e) => fail(args.format, &e.into()),
    };

    let mut config = load_config()?;
    args.apply_overrides(&mut config);
    if config.provider.api_key.is_none() {
        config.provider.api_key = Env::real()
            .var(config.provider.name.api_key_env_var())
            .ok();
    }
    info!(
        "provider {} · model {} · map model {}",
        config.provider.name,
        config.provider.model,
        config.provider.map_model()
    );

    let client = Arc::new(GithubClient::new(&config.github).context("failed to create GitHub client")?);
    let provider = Arc::new(
        RigProvider::new(config.provider.clone()).context("failed to initialise LLM provider")?,
    );

    let pipeline = SummaryPipeline::new(
        client.clone(),
        client,
        provider,
        config.limits.clone(),
        config.request.timeout(),
    );

    match pipeline.run(&repo).await {
        Ok(outcome) => {
            print!("{}", args.format.renderer().render(&outcome));
            if args.format == cli::args::OutputFormat::Json {
                println!();
            }
            Ok(())
        }
        Err(e) => fail(args.format, &e),
    }
}

async fn run_rank(args: RankArgs) -> Result<()> {
    let repo = match parse_repo_url(&args.url) {
        Ok(repo) => repo,
        Err(e) => fail(args.format, &e.into()),
    };

    let mut config = load_config()?;
    args.apply_overrides(&mut config);

    let client = GithubClient::new(&config.github).context("failed to create GitHub client")?;
    let tree = match client.tree(&repo).await {
        Ok(tree) => tree,
        Err(e) => fail(args.format, &e.into()),
    };
    let mut ranked = match ranker::rank(&tree.files, &RankLimits::from(&config.limits)) {
        Ok(ranked) => ranked,
        Err(e) => fail(args.format, &e.into()),
    };
    if let Some(limit) = args.limit {
        ranked.truncate(limit);
    }

    print!("{}", args.format.renderer().render_ranked(&repo, &ranked));
    if args.format == cli::args::OutputFormat::Json {
        println!();
    }
    Ok(())
}
