use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use ghstats::view::{Session, ViewState};
use ghstats::{Config, FetchError, GithubClient, StatsAggregator, render};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Show profile details, repositories and pull-request stats for GitHub users
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub usernames to look up, one after another
    #[arg(required = true, value_name = "USERNAME")]
    usernames: Vec<String>,

    /// Token sent as `Authorization: Bearer`; anonymous when unset
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// REST API root, e.g. for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Give up on a lookup after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_filter(&self) -> EnvFilter {
        let level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

fn init_logging(args: &Args) {
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the token may come from the real environment.
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args);

    let config = Config::new(args.api_url.clone(), args.token.clone(), args.timeout_secs);
    debug!(api = %config.api_base, authenticated = config.credential.is_some(), "configured");

    let client = GithubClient::new(&config)?;
    let aggregator = StatsAggregator::new(client);
    let mut session = Session::new();
    let mut failures = 0usize;

    for username in &args.usernames {
        let ticket = session.begin(username);
        let result = fetch(&aggregator, &config, username).await;
        session.complete(ticket, result);

        match session.state() {
            ViewState::Success(snapshot) => match args.format {
                OutputFormat::Text => {
                    println!("{}", render::render_text(snapshot, Utc::now().date_naive()))
                }
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(snapshot)
                        .context("Failed to serialize snapshot")?
                ),
            },
            ViewState::Failed(err) => {
                failures += 1;
                error!(username = username.as_str(), "{err:#}");
                match err {
                    FetchError::InvalidInput => eprintln!("Enter a GitHub username!"),
                    FetchError::FetchFailed { source, .. } => {
                        eprintln!("Failed to fetch GitHub data for {username}: {err} ({source:#})")
                    }
                }
            }
            ViewState::Idle | ViewState::Loading { .. } => {}
        }
    }

    lookup_outcome(failures, args.usernames.len())
}

/// Turns the failure tally into `main`'s result so the process exits non-zero.
fn lookup_outcome(failures: usize, total: usize) -> Result<()> {
    if failures > 0 {
        anyhow::bail!("{failures} of {total} lookup(s) failed");
    }
    Ok(())
}

async fn fetch(
    aggregator: &StatsAggregator<GithubClient>,
    config: &Config,
    username: &str,
) -> Result<ghstats::ProfileSnapshot, FetchError> {
    let credential = config.credential.as_ref();
    let lookup = aggregator.fetch_snapshot(username, credential);

    match config.timeout {
        Some(limit) => tokio::time::timeout(limit, lookup)
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::FetchFailed {
                    endpoint: None,
                    source: anyhow::anyhow!("no response within {}s", limit.as_secs()),
                })
            }),
        None => lookup.await,
    }
}
