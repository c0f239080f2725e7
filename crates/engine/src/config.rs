//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `POS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`).
//!   Without one the terminal runs on an in-memory catalog.
//! - `POS_CATALOG_MODE` - `simple` or `paginated` (default: `paginated` with a database, else `simple`)
//! - `POS_PAGE_SIZE` - Products per page (default: 20)
//! - `POS_TAX_RATE` - Sales tax as a fraction, e.g. `0.0825` (default: 0)
//! - `POS_QUERY_CACHE_TTL_SECS` - Page cache lifetime, 0 disables (default: 0)
//! - `POS_DEVICE_PROVIDER` - `mock` or `live` (default: mock)
//! - `POS_DEVICE_REGISTRY` - Device registry JSON file (required when provider is `live`)

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use crate::cart::TaxPolicy;
use crate::device::DeviceSource;
use crate::query::DEFAULT_PAGE_SIZE;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which catalog backend serves product lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode {
    /// Whole catalog in memory via `CatalogStore`.
    Simple,
    /// Paginated queries via `ProductQueryService`.
    Paginated,
}

impl std::str::FromStr for CatalogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "paginated" => Ok(Self::Paginated),
            _ => Err(format!("expected 'simple' or 'paginated', got '{s}'")),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Catalog backend
    pub catalog_mode: CatalogMode,
    /// Default page size for catalog queries
    pub page_size: u32,
    /// Sales tax policy
    pub tax: TaxPolicy,
    /// Page cache lifetime (zero disables caching)
    pub query_cache_ttl: Duration,
    /// Peripheral device source
    pub devices: DeviceSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            catalog_mode: CatalogMode::Simple,
            page_size: DEFAULT_PAGE_SIZE,
            tax: TaxPolicy::EXEMPT,
            query_cache_ttl: Duration::ZERO,
            devices: DeviceSource::Mock,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// live device provider is selected without a registry path.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::from_env`].
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = var("POS_DATABASE_URL")
            .or_else(|| var("DATABASE_URL"))
            .map(SecretString::from);

        let catalog_mode = match var("POS_CATALOG_MODE") {
            Some(raw) => parse_var("POS_CATALOG_MODE", &raw)?,
            None if database_url.is_some() => CatalogMode::Paginated,
            None => CatalogMode::Simple,
        };
        if catalog_mode == CatalogMode::Paginated && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("POS_DATABASE_URL".to_string()));
        }

        let page_size: u32 = var_or_default(&var, "POS_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "POS_PAGE_SIZE".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        let tax_rate: Decimal = var_or_default(&var, "POS_TAX_RATE", Decimal::ZERO)?;
        if tax_rate.is_sign_negative() || tax_rate > Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "POS_TAX_RATE".to_string(),
                "must be between 0 and 1".to_string(),
            ));
        }

        let cache_secs: u64 = var_or_default(&var, "POS_QUERY_CACHE_TTL_SECS", 0)?;

        let devices = match var("POS_DEVICE_PROVIDER").as_deref() {
            None | Some("mock") => DeviceSource::Mock,
            Some("live") => var("POS_DEVICE_REGISTRY")
                .map(|path| DeviceSource::Live(PathBuf::from(path)))
                .ok_or_else(|| ConfigError::MissingEnvVar("POS_DEVICE_REGISTRY".to_string()))?,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "POS_DEVICE_PROVIDER".to_string(),
                    format!("expected 'mock' or 'live', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            database_url,
            catalog_mode,
            page_size,
            tax: TaxPolicy::new(tax_rate),
            query_cache_ttl: Duration::from_secs(cache_secs),
            devices,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable's raw value.
fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional variable, falling back to a default when unset.
fn var_or_default<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var(key).map_or(Ok(default), |raw| parse_var(key, &raw))
}
