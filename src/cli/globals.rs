use crate::{
    cli::commands::client::Options,
    client::{AppConfig, AppError},
};
use std::path::PathBuf;

/// Settings shared by every session command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: AppConfig,
    pub state_dir: PathBuf,
}

impl GlobalArgs {
    /// Resolves the client configuration from parsed options.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the resulting base URL or timeout is invalid.
    pub fn new(options: Options) -> Result<Self, AppError> {
        let config = AppConfig::load(options.environment).with_overrides(options.runtime.into());
        config.validate()?;

        Ok(Self {
            config,
            state_dir: options.state_dir,
        })
    }
}
