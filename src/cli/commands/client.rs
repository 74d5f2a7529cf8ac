use crate::client::{Environment, config::RuntimeConfig};
use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command};
use std::{path::PathBuf, str::FromStr};

pub const ARG_ENV: &str = "env";
pub const ARG_API_URL: &str = "api-url";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_STATE_DIR: &str = "state-dir";

#[derive(Debug, Clone)]
pub struct Options {
    pub environment: Environment,
    pub runtime: RuntimeOptions,
    pub state_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl From<RuntimeOptions> for RuntimeConfig {
    fn from(options: RuntimeOptions) -> Self {
        RuntimeConfig {
            api_base_url: options.api_url,
            timeout_secs: options.timeout_secs,
        }
    }
}

impl Options {
    /// Parse backend and storage arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the environment name is unknown or no state directory can be resolved.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let environment = match matches.get_one::<String>(ARG_ENV) {
            Some(name) => Environment::from_str(name).map_err(|err| anyhow!(err))?,
            None => Environment::current(),
        };

        let state_dir = match matches.get_one::<PathBuf>(ARG_STATE_DIR) {
            Some(dir) => dir.clone(),
            None => default_state_dir()?,
        };

        Ok(Self {
            environment,
            runtime: RuntimeOptions {
                api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
                timeout_secs: matches.get_one::<u64>(ARG_TIMEOUT).copied(),
            },
            state_dir,
        })
    }
}

fn default_state_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("app", "authflow", "authflow")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .context("unable to determine a state directory, use --state-dir")
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENV)
                .short('e')
                .long(ARG_ENV)
                .help("Backend environment: debug or production (default: build profile)")
                .env("AUTHFLOW_ENV")
                .global(true),
        )
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Backend base URL, example: https://api.authflow.app/api")
                .env("AUTHFLOW_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds (default: 10)")
                .env("AUTHFLOW_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long(ARG_STATE_DIR)
                .help("Directory holding the persisted session")
                .env("AUTHFLOW_STATE_DIR")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}
