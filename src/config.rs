//! Command line and environment configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it. An optional dotenv file (`--env <path>` or `ENV`) is
//! loaded first and overrides the process environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::core::{Credentials, ExtractError, IcmClient, PersistentErrorBackoff, RetryConfig};
use crate::icm::DatasetScope;
use crate::logging::LogFormat;
use crate::scheduler::{CronError, CronSchedule};
use crate::sink::{FileSink, HttpSink, Sink};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no sink configured: set SINK_FILE or SINK_URL")]
    MissingSink,

    #[error("SINK_FILE and SINK_URL cannot both be set")]
    ConflictingSinks,

    #[error("{name} must not be empty")]
    Empty { name: &'static str },

    #[error(transparent)]
    Cron(#[from] CronError),

    #[error("failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Raw options as given on the command line or in the environment.
#[derive(Debug, Parser)]
#[command(name = "icm-extract", version, about)]
pub struct Cli {
    /// Dotenv file loaded before the other options are read.
    #[arg(long = "env", env = "ENV", value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    #[arg(long, env = "USERNAME")]
    pub username: String,

    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, env = "HTTPS_PROXY")]
    pub https_proxy: Option<Url>,

    /// Retries per request after the first attempt.
    #[arg(long, env = "RETRY", default_value_t = 5)]
    pub retry: u32,

    #[arg(long, env = "RETRY_DELAY", value_name = "MS", default_value_t = 10_000)]
    pub retry_delay: u64,

    /// Cooldown after the first failed cycle; grows with the square of the
    /// failure count.
    #[arg(
        long,
        env = "PERSISTENT_ERROR_COOLDOWN",
        value_name = "MS",
        default_value_t = 120_000
    )]
    pub persistent_error_cooldown: u64,

    #[arg(
        long,
        env = "PERSISTENT_ERROR_COOLDOWN_MAX",
        value_name = "MS",
        default_value_t = 21_600_000
    )]
    pub persistent_error_cooldown_max: u64,

    /// Repeat on this schedule (5 fields, or 6/7 with seconds). Runs once when unset.
    #[arg(long, env = "CRON")]
    pub cron: Option<String>,

    #[arg(long, env = "ICM_BASE_URL")]
    pub icm_base_url: Option<Url>,

    #[arg(long, env = "ICM_LOGIN_URL")]
    pub icm_login_url: Option<Url>,

    /// Per-request HTTP timeout.
    #[arg(long, env = "HTTP_TIMEOUT", value_name = "MS")]
    pub http_timeout: Option<u64>,

    #[arg(long, env = "ICM_PRODUCT_SEQ", default_value_t = 3321)]
    pub product_seq: i64,

    #[arg(long, env = "ICM_GENERATION_SEQ", default_value_t = 1841)]
    pub generation_seq: i64,

    #[arg(long, env = "ICM_VIEW_SEQ", default_value_t = 81)]
    pub view_seq: i64,

    #[arg(long, env = "ICM_STATUS_FILTER", default_value = "N;|;G;|;Z;|;Y")]
    pub status_filter: String,

    /// Write the Parquet table to this file.
    #[arg(long, env = "SINK_FILE")]
    pub sink_file: Option<PathBuf>,

    /// Upload the Parquet table to this URL with `PUT`.
    #[arg(long, env = "SINK_URL")]
    pub sink_url: Option<Url>,

    #[arg(long, env = "SINK_TOKEN", hide_env_values = true)]
    pub sink_token: Option<String>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,
}

/// Where the encoded table goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkTarget {
    File(PathBuf),
    Http { url: Url, token: Option<String> },
}

/// Validated configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub https_proxy: Option<Url>,
    pub retry: RetryConfig,
    pub cooldown: Duration,
    pub cooldown_max: Duration,
    pub schedule: Option<CronSchedule>,
    pub base_url: Option<Url>,
    pub login_url: Option<Url>,
    pub http_timeout: Option<Duration>,
    pub scope: DatasetScope,
    pub sink: SinkTarget,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.username.trim().is_empty() {
            return Err(ConfigError::Empty { name: "USERNAME" });
        }
        if cli.password.is_empty() {
            return Err(ConfigError::Empty { name: "PASSWORD" });
        }

        let sink = match (cli.sink_file, cli.sink_url) {
            (Some(path), None) => SinkTarget::File(path),
            (None, Some(url)) => SinkTarget::Http {
                url,
                token: cli.sink_token.filter(|t| !t.is_empty()),
            },
            (None, None) => return Err(ConfigError::MissingSink),
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingSinks),
        };

        let schedule = match cli.cron.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(expr) => Some(CronSchedule::parse(expr)?),
        };

        Ok(Self {
            credentials: Credentials::new(cli.username, cli.password),
            https_proxy: cli.https_proxy,
            retry: RetryConfig {
                max_retries: cli.retry,
                delay: Duration::from_millis(cli.retry_delay),
                reset_on_success: true,
            },
            cooldown: Duration::from_millis(cli.persistent_error_cooldown),
            cooldown_max: Duration::from_millis(cli.persistent_error_cooldown_max),
            schedule,
            base_url: cli.icm_base_url,
            login_url: cli.icm_login_url,
            http_timeout: cli.http_timeout.map(Duration::from_millis),
            scope: DatasetScope {
                product_seq: cli.product_seq,
                generation_seq: cli.generation_seq,
                view_seq: cli.view_seq,
                status_filter: cli.status_filter,
            },
            sink,
            log_format: cli.log_format,
        })
    }

    pub fn backoff(&self) -> PersistentErrorBackoff {
        PersistentErrorBackoff::new(self.cooldown, self.cooldown_max)
    }

    /// HTTP client for the configured ICM endpoints.
    pub fn client(&self) -> Result<IcmClient, ExtractError> {
        let mut builder = IcmClient::builder();
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }
        if let Some(url) = &self.login_url {
            builder = builder.login_url(url.clone());
        }
        if let Some(proxy) = &self.https_proxy {
            builder = builder.https_proxy(proxy.clone());
        }
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    pub fn sink(&self) -> Arc<dyn Sink> {
        match &self.sink {
            SinkTarget::File(path) => Arc::new(FileSink::new(path.clone())),
            SinkTarget::Http { url, token } => {
                let sink = HttpSink::new(url.clone());
                match token {
                    Some(token) => Arc::new(sink.bearer_token(token.clone())),
                    None => Arc::new(sink),
                }
            }
        }
    }
}

/// Load the dotenv file named by `--env` in `args`, else by `ENV`.
///
/// Returns the loaded path, if any.
pub fn load_env_file<I>(args: I) -> Result<Option<PathBuf>, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let Some(path) = env_file_arg(args).or_else(|| std::env::var_os("ENV").map(PathBuf::from))
    else {
        return Ok(None);
    };

    dotenvy::from_path_override(&path).map_err(|source| ConfigError::EnvFile {
        path: path.clone(),
        source,
    })?;
    Ok(Some(path))
}

fn env_file_arg<I>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--env" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--env=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
