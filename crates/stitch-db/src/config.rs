//! Shop configuration module.
//!
//! Configuration is loaded from `STITCH_*` environment variables with
//! fallback to defaults.
//!
//! | Variable                        | Default          |
//! |---------------------------------|------------------|
//! | `STITCH_DATABASE_PATH`          | `stitchworks.db` |
//! | `STITCH_TAX_PERCENT`            | `16`             |
//! | `STITCH_PROFIT_MARGIN_PERCENT`  | `30`             |
//! | `STITCH_DELIVERY_LEAD_DAYS`     | `7`              |
//! | `STITCH_MAX_CONNECTIONS`        | `5`              |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use stitch_core::validation::validate_percent;
use stitch_core::{Percent, DEFAULT_DELIVERY_LEAD_DAYS, DEFAULT_PROFIT_MARGIN, DEFAULT_TAX_RATE};

use crate::pool::DbConfig;

/// Shop-wide settings applied to new orders and the database pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Tax rate applied to new orders
    pub tax_rate: Percent,

    /// Profit margin recorded on new orders (reporting only)
    pub profit_margin: Percent,

    /// Days from order creation to estimated delivery
    pub delivery_lead_days: i64,

    /// Maximum pooled connections
    pub max_connections: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            database_path: PathBuf::from("stitchworks.db"),
            tax_rate: DEFAULT_TAX_RATE,
            profit_margin: DEFAULT_PROFIT_MARGIN,
            delivery_lead_days: DEFAULT_DELIVERY_LEAD_DAYS,
            max_connections: 5,
        }
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ShopConfig::default();

        let config = ShopConfig {
            database_path: lookup("STITCH_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            tax_rate: match lookup("STITCH_TAX_PERCENT") {
                Some(raw) => parse_percent("STITCH_TAX_PERCENT", &raw)?,
                None => defaults.tax_rate,
            },

            profit_margin: match lookup("STITCH_PROFIT_MARGIN_PERCENT") {
                Some(raw) => parse_percent("STITCH_PROFIT_MARGIN_PERCENT", &raw)?,
                None => defaults.profit_margin,
            },

            delivery_lead_days: lookup("STITCH_DELIVERY_LEAD_DAYS")
                .unwrap_or_else(|| defaults.delivery_lead_days.to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STITCH_DELIVERY_LEAD_DAYS".to_string()))?,

            max_connections: lookup("STITCH_MAX_CONNECTIONS")
                .unwrap_or_else(|| defaults.max_connections.to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STITCH_MAX_CONNECTIONS".to_string()))?,
        };

        if config.delivery_lead_days < 0 {
            return Err(ConfigError::InvalidValue(
                "STITCH_DELIVERY_LEAD_DAYS".to_string(),
            ));
        }
        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("STITCH_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Pool configuration derived from these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

fn parse_percent(var: &str, raw: &str) -> Result<Percent, ConfigError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(var.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidValue(var.to_string()));
    }
    let rate = Percent::from_percentage(value);
    validate_percent(var, rate).map_err(|_| ConfigError::InvalidValue(var.to_string()))?;
    Ok(rate)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShopConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.tax_rate.bps(), 1600);
        assert_eq!(config.profit_margin.bps(), 3000);
        assert_eq!(config.delivery_lead_days, 7);
    }

    #[test]
    fn test_overrides() {
        let config = ShopConfig::from_lookup(lookup(&[
            ("STITCH_DATABASE_PATH", "/var/lib/stitch/shop.db"),
            ("STITCH_TAX_PERCENT", "8.25"),
            ("STITCH_PROFIT_MARGIN_PERCENT", "0"),
            ("STITCH_DELIVERY_LEAD_DAYS", "10"),
            ("STITCH_MAX_CONNECTIONS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/stitch/shop.db"));
        assert_eq!(config.tax_rate.bps(), 825);
        assert!(config.profit_margin.is_zero());
        assert_eq!(config.delivery_lead_days, 10);
        assert_eq!(config.db_config().max_connections, 2);
    }

    #[test]
    fn test_invalid_values() {
        for (var, value) in [
            ("STITCH_TAX_PERCENT", "sixteen"),
            ("STITCH_TAX_PERCENT", "-1"),
            ("STITCH_TAX_PERCENT", "150"),
            ("STITCH_DELIVERY_LEAD_DAYS", "-3"),
            ("STITCH_MAX_CONNECTIONS", "0"),
        ] {
            let err = ShopConfig::from_lookup(lookup(&[(var, value)])).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid value for {var}"));
        }
    }
}
