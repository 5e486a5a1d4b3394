//! Composition root: builds the SDK object graph from `bright.toml`.
//!
//! Every scan subcommand goes through [`Context::load`], which wires
//! configuration, credentials, retry policy, HTTP dispatcher and the
//! scan API together by plain constructor injection.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use bright_core::config::{BrightConfig, Configuration};
use bright_core::error::{BrightError, ConfigError};
use bright_core::retry::RetryPolicy;
use bright_http::HttpCommandDispatcher;
use bright_scan::RestScans;

use crate::error::CliError;

/// Scan API bound to the production HTTP dispatcher.
pub type Scans = RestScans<HttpCommandDispatcher<RetryPolicy>>;

/// Fully wired runtime for scan subcommands.
pub struct Context {
    pub config: BrightConfig,
    pub scans: Scans,
}

impl Context {
    /// Load configuration and construct the dispatcher and scan API.
    ///
    /// # Errors
    ///
    /// Configuration and credential problems map to exit code 2.
    pub async fn load(config_path: &Path) -> Result<Self, CliError> {
        let config = load_config(config_path).await?;

        let mut configuration = Configuration::from_config(&config);
        configuration.load_credentials().await?;

        let retry = RetryPolicy::from_config(&config.retry)?;
        let dispatcher = HttpCommandDispatcher::from_configuration(&configuration, retry)?;
        info!(base_url = dispatcher.base_url(), "dispatcher ready");

        Ok(Self {
            config,
            scans: RestScans::new(Arc::new(dispatcher)),
        })
    }
}

/// Load `bright.toml`, falling back to defaults plus env overrides when
/// the file does not exist.
///
/// A missing file is not an error for scan commands: the API key can come
/// from `BRIGHT_TOKEN` and everything else has defaults.
pub async fn load_config(config_path: &Path) -> Result<BrightConfig, CliError> {
    match BrightConfig::load(config_path).await {
        Ok(config) => Ok(config),
        Err(BrightError::Config(ConfigError::FileNotFound { .. })) => {
            debug!(path = %config_path.display(), "config file not found, using defaults");
            let mut config = BrightConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}
