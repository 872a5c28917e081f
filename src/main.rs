use anyhow::Context;
use clap::Parser;
use group_prune::app::{self, RunOptions, RunStatus};
use group_prune::config::{ConfigLoader, PruneConfig};
use group_prune::gitlab::{GitlabClient, GroupApi};
use group_prune::interaction::UserPrompterImpl;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

/// Remove non-whitelisted developers and above from selected groups
#[derive(Parser)]
#[command(name = "group-prune", version)]
#[command(about = "Prune GitLab group memberships down to a whitelist", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Base API URL, e.g. https://gitlab.example.com/api/v4
    #[arg(long)]
    api_url: Option<String>,

    /// Page size for list requests
    #[arg(long)]
    per_page: Option<u32>,

    /// Maximum concurrent API requests
    #[arg(short = 'j', long)]
    max_concurrent: Option<usize>,

    /// Group id, name, or full path to prune (repeatable; skips selection prompts)
    #[arg(short = 'g', long = "group")]
    groups: Vec<String>,

    /// Do not ask for confirmation before executing
    #[arg(short = 'y', long)]
    yes: bool,

    /// Exit with status 2 when any group or member operation failed
    #[arg(long)]
    fail_on_errors: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli).await;

    let configured_level = config
        .as_ref()
        .map(|c| c.get_log_level().to_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    let log_level = match cli.verbose {
        0 => configured_level,
        1 => "debug".to_string(),
        2 => "trace".to_string(),
        _ => "trace,hyper=debug,reqwest=debug".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    debug!("group-prune started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    match execute(&cli, config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn load_config(cli: &Cli) -> anyhow::Result<PruneConfig> {
    let mut config = ConfigLoader::new()
        .load_file(cli.config.as_deref())
        .await?
        .merge_env_vars()?
        .build()
        .context("invalid configuration")?;

    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(per_page) = cli.per_page {
        config.per_page = per_page;
    }
    if let Some(max_concurrent) = cli.max_concurrent {
        config.max_concurrent_requests = max_concurrent;
    }
    if cli.fail_on_errors {
        config.fail_on_errors = true;
    }

    config.validate().context("invalid command line options")?;
    Ok(config)
}

async fn execute(cli: &Cli, config: PruneConfig) -> anyhow::Result<i32> {
    let options = RunOptions {
        assume_yes: cli.yes,
        groups: cli.groups.clone(),
    };
    let prompter = UserPrompterImpl::new();

    let status = app::run(config.clone(), &options, &prompter, |config| {
        Ok(Arc::new(GitlabClient::new(config)?) as Arc<dyn GroupApi>)
    })
    .await?;

    match &status {
        RunStatus::Declined => {}
        RunStatus::GroupsUnavailable(reason) => {
            eprintln!("Could not list groups: {reason}");
        }
        RunStatus::Completed(report) if cli.json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        RunStatus::Completed(report) => print!("{report}"),
    }

    Ok(status.exit_code(&config))
}
