use serde::Deserialize;
use std::env;

use crate::core::{EngineError, Result};

pub mod database;

pub use database::DatabaseConfig;

/// Main engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Knobs for the document engine itself
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// TTL for cached analytics aggregates, in minutes
    pub analytics_ttl_minutes: u64,
    /// Bounded retries when assigning a document number
    pub sequence_max_attempts: u32,
    /// Whether deleting every payment may advance a DRAFT invoice to COMPLETED
    pub complete_draft_on_refund: bool,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            analytics_ttl_minutes: 10,
            sequence_max_attempts: 3,
            complete_draft_on_refund: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            billing: BillingConfig {
                analytics_ttl_minutes: env::var("ANALYTICS_CACHE_TTL_MINUTES")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .map_err(|_| {
                        EngineError::configuration("Invalid ANALYTICS_CACHE_TTL_MINUTES")
                    })?,
                sequence_max_attempts: env::var("SEQUENCE_MAX_ATTEMPTS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .map_err(|_| EngineError::configuration("Invalid SEQUENCE_MAX_ATTEMPTS"))?,
                complete_draft_on_refund: env::var("LEDGER_COMPLETE_DRAFT_ON_REFUND")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.billing.analytics_ttl_minutes == 0 {
            return Err(EngineError::configuration(
                "Analytics cache TTL must be greater than 0",
            ));
        }

        if self.billing.sequence_max_attempts == 0 {
            return Err(EngineError::configuration(
                "Sequence retry attempts must be greater than 0",
            ));
        }

        Ok(())
    }
}
