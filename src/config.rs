use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

use crate::entities::Gender;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_SHIPPING_FEE: i64 = 3_000;
const DEFAULT_SUIT_CAP: i64 = 30_000;

/// Amounts and caps used when turning a coupon into order lines.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CouponConfig {
    /// Delivery fee refunded by a free-shipping coupon (won)
    #[serde(default = "default_shipping_fee")]
    #[validate(range(min = 0))]
    pub shipping_fee: i64,

    /// Share of the base price charged per extension day (late-fee rate)
    #[serde(default = "default_extension_rate")]
    #[validate(custom = "validate_extension_rate")]
    pub extension_rate: Decimal,

    /// Maximum single-item discount by gender (won)
    #[serde(default = "default_suit_caps")]
    #[validate(custom = "validate_suit_caps")]
    pub suit_caps: HashMap<Gender, i64>,

    /// Single-item cap when the user's gender is unknown or not listed
    #[serde(default = "default_suit_cap")]
    #[validate(range(min = 0))]
    pub default_suit_cap: i64,
}

impl Default for CouponConfig {
    fn default() -> Self {
        Self {
            shipping_fee: default_shipping_fee(),
            extension_rate: default_extension_rate(),
            suit_caps: default_suit_caps(),
            default_suit_cap: default_suit_cap(),
        }
    }
}

impl CouponConfig {
    /// Cap for a single-item coupon: the coupon's own amount wins, then the
    /// per-gender table, then the global default.
    pub fn suit_cap(&self, coupon_price: i64, gender: Option<Gender>) -> i64 {
        if coupon_price != 0 {
            return coupon_price;
        }
        gender
            .and_then(|g| self.suit_caps.get(&g).copied())
            .unwrap_or(self.default_suit_cap)
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Coupon amounts and caps
    #[serde(default)]
    #[validate]
    pub coupon: CouponConfig,
}

impl AppConfig {
    /// Creates a new configuration with default tuning
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            coupon: CouponConfig::default(),
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_db_max_connections() -> u32 {
    8
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_shipping_fee() -> i64 {
    DEFAULT_SHIPPING_FEE
}

fn default_extension_rate() -> Decimal {
    dec!(0.2)
}

fn default_suit_caps() -> HashMap<Gender, i64> {
    HashMap::from([(Gender::Male, 30_000), (Gender::Female, 20_000)])
}

fn default_suit_cap() -> i64 {
    DEFAULT_SUIT_CAP
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_extension_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if rate.is_sign_negative() || *rate > Decimal::ONE {
        let mut err = ValidationError::new("extension_rate");
        err.message = Some("extension_rate must be between 0.0 and 1.0".into());
        return Err(err);
    }
    Ok(())
}

fn validate_suit_caps(caps: &HashMap<Gender, i64>) -> Result<(), ValidationError> {
    if caps.values().any(|cap| *cap < 0) {
        let mut err = ValidationError::new("suit_caps");
        err.message = Some("suit caps must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("rental_coupons={},coupon_cli={}", level, level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`], reading TOML files from `config_dir`.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://coupons.db?mode=rwc")?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&config_dir.join("default").to_string_lossy()).required(false))
        .add_source(File::with_name(&config_dir.join(&run_env).to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
