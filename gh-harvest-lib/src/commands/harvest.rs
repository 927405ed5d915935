use super::Host;
use super::common::{ColorMode, LogLevel, init_logging};
use super::config::Config;
use super::progress_reporter::ProgressReporter;
use crate::Result;
use crate::fetch::{Client, DispatchSummary, Dispatcher, Progress, RetryPolicy, UserPipeline, WorkTracker, worker_count};
use crate::output::{CsvSink, read_identifiers};
use camino::Utf8PathBuf;
use clap::Parser;
use core::time::Duration;
use ohno::bail;
use secrecy::SecretString;
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "   harvest";

#[derive(Parser, Debug)]
pub struct HarvestArgs {
    /// CSV file listing the users to fetch
    #[arg(value_name = "INPUT")]
    pub input: Utf8PathBuf,

    /// CSV file receiving one row per user repository
    #[arg(value_name = "OUTPUT", default_value = "github_profiles_and_repos.csv")]
    pub output: Utf8PathBuf,

    /// File receiving one line per user that could not be fetched
    #[arg(long, value_name = "PATH", default_value = "error_log.txt")]
    pub error_log: Utf8PathBuf,

    /// Path to configuration file (default is `gh-harvest.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, value_name = "URL", env = "GITHUB_API_URL")]
    pub api_base_url: Option<String>,

    /// Input CSV column holding the login
    #[arg(long, value_name = "NAME")]
    pub login_column: Option<String>,

    /// Maximum number of users fetched concurrently
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Retries allowed for a rate-limited request
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Seconds to wait before retrying a rate-limited request
    #[arg(long, value_name = "SECONDS")]
    pub retry_delay: Option<u64>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

impl HarvestArgs {
    /// Layer command-line overrides on top of the loaded configuration.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_base_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(column) = &self.login_column {
            config.login_column.clone_from(column);
        }
        if let Some(workers) = self.max_workers {
            config.max_concurrent_workers = workers;
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        if let Some(secs) = self.retry_delay {
            config.retry_delay = Duration::from_secs(secs);
        }
    }

    fn token(&self) -> Result<SecretString> {
        match self.github_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(SecretString::new(token.to_string())),
            _ => bail!("a GitHub token is required; set GITHUB_TOKEN or pass --github-token"),
        }
    }
}

pub async fn process_harvest<H: Host>(host: &mut H, args: &HarvestArgs) -> Result<()> {
    init_logging(args.log_level);

    let token = args.token()?;

    let mut config = Config::load(args.config.as_ref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let identifiers = read_identifiers(&args.input, &config.login_column)?;
    log::info!(target: LOG_TARGET, "Read {} unique users from '{}'", identifiers.len(), args.input);

    let sink = Arc::new(CsvSink::create(&args.output, &args.error_log)?);

    let retry = RetryPolicy {
        max_retries: config.max_retries,
        retry_delay: config.retry_delay,
    };
    let client = Client::new(&token, config.api_url()?, &config.user_agent, config.request_timeout, retry)?;
    let pipeline = Arc::new(UserPipeline::new(client));

    let progress: Arc<dyn Progress> = Arc::new(ProgressReporter::new(args.log_level.progress_delay(), args.color.use_colors()));
    progress.set_phase("Fetching");
    let tracker = WorkTracker::new(&progress);

    let dispatcher = Dispatcher::new(pipeline, sink, tracker, worker_count(config.max_concurrent_workers));
    let result = dispatcher.run(identifiers).await;
    progress.done();

    report(host, args, &result?);
    Ok(())
}

fn report<H: Host>(host: &mut H, args: &HarvestArgs, summary: &DispatchSummary) {
    let _ = writeln!(
        host.output(),
        "Processed {} users: {} succeeded, {} failed",
        summary.total,
        summary.succeeded,
        summary.failed
    );
    let _ = writeln!(host.output(), "Results written to {}", args.output);
    if summary.failed > 0 {
        let _ = writeln!(host.output(), "Failures logged to {}", args.error_log);
    }
}
