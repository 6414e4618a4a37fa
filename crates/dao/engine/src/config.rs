//! Configuration for the governance engine and its host.

use dao_types::{ActorId, Amount, AssetRef, GovernanceParams, QuorumPolicy, WeightPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::DEFAULT_EVENT_CAPACITY;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("weight policy {0:?} requires a historical governance-token ledger")]
    MissingHistory(WeightPolicy),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Governance parameters, immutable once the engine is built
    #[serde(default = "default_params")]
    pub governance: GovernanceParams,

    /// Event broadcast configuration
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            governance: default_params(),
            events: EventsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Event broadcast configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Events buffered per subscriber before it starts lagging
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// 18-decimal governance token, 6-decimal stable treasury asset and a quorum
/// one base unit above 500,000 whole tokens.
fn default_params() -> GovernanceParams {
    GovernanceParams {
        governance_token: AssetRef::new("snarf", "SNARF", 18),
        treasury_asset: AssetRef::new("usdc", "USDC", 6),
        treasury_account: ActorId::new("dao-treasury"),
        quorum: Amount::new(500_000 * 10u128.pow(18) + 1),
        quorum_policy: QuorumPolicy::Approval,
        weight_policy: WeightPolicy::Live,
    }
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GovernanceConfig {
    /// Load configuration: defaults, then the optional file, then `DAO_`
    /// environment variables (`DAO_GOVERNANCE__QUORUM`, `DAO_LOGGING__LEVEL`, ...).
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();

        builder = builder.add_source(::config::Config::try_from(&GovernanceConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("DAO")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: GovernanceConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = &self.governance;

        for asset in [&params.governance_token, &params.treasury_asset] {
            if asset.id.trim().is_empty() {
                return Err(ConfigError::Invalid("asset id must not be empty".into()));
            }
            if asset.decimals > 38 {
                return Err(ConfigError::Invalid(format!(
                    "asset {} has {} decimals; at most 38 fit in 128 bits",
                    asset.id, asset.decimals
                )));
            }
        }

        if params.governance_token.id == params.treasury_asset.id {
            return Err(ConfigError::Invalid(format!(
                "governance token and treasury asset must differ (both are {})",
                params.governance_token.id
            )));
        }

        if params.treasury_account.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid(
                "treasury account must not be empty".into(),
            ));
        }

        if self.events.capacity == 0 {
            return Err(ConfigError::Invalid(
                "event capacity must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
