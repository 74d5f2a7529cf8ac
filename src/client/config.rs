//! Build-time configuration for the backend endpoint with runtime overrides.
//! Debug and production builds differ only in the target host; the protocol,
//! paths and timeout are the same. `AUTHFLOW_API_BASE_URL` set at build time
//! replaces the per-environment default, and the command line can override it
//! again at run time. Configuration values are public; do not store secrets
//! here.

use super::errors::AppError;
use std::{fmt, str::FromStr, time::Duration};
use url::Url;

/// Default request timeout applied to every backend call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const DEBUG_BASE_URL: &str = "http://localhost:3000/api";
const PRODUCTION_BASE_URL: &str = "https://api.authflow.app/api";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Debug,
    Production,
}

impl Environment {
    /// Environment matching the build profile.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Environment::Debug
        } else {
            Environment::Production
        }
    }

    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Environment::Debug => DEBUG_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Debug => write!(f, "debug"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "debug" | "dev" | "development" => Ok(Environment::Debug),
            "production" | "prod" | "release" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Client configuration derived from the environment and overrides.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: Environment,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl AppConfig {
    /// Loads the defaults for `environment`, honouring the build-time base URL.
    #[must_use]
    pub fn load(environment: Environment) -> Self {
        let api_base_url = option_env!("AUTHFLOW_API_BASE_URL")
            .and_then(normalize_runtime_value)
            .unwrap_or_else(|| environment.default_base_url().to_string());

        Self {
            environment,
            api_base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Applies runtime overrides, ignoring blank values.
    #[must_use]
    pub fn with_overrides(mut self, runtime: RuntimeConfig) -> Self {
        apply_runtime_overrides(&mut self, runtime);
        self
    }

    /// Checks that the base URL is an absolute http(s) URL.
    ///
    /// # Errors
    /// Returns `AppError::Config` when the URL cannot be parsed or uses another scheme.
    pub fn validate(&self) -> Result<(), AppError> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|err| AppError::Config(format!("Invalid API base URL: {err}")))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::Config(format!(
                    "Unsupported API base URL scheme: {scheme}"
                )));
            }
        }

        if url.host().is_none() {
            return Err(AppError::Config(
                "Invalid API base URL: no host specified".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(AppError::Config(
                "Request timeout must be greater than zero.".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds a URL from the configured base URL and the provided path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.api_base_url, path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::load(Environment::current())
    }
}

/// Values supplied at run time by flags or environment variables.
#[derive(Debug, Default)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url.as_deref().and_then(normalize_runtime_value) {
        config.api_base_url = value;
    }
    if let Some(secs) = runtime.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
}

pub(crate) fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Builds a URL from an explicit base URL and the provided path.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}
