//! Configuration for settlement engine

use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do when balances do not sum to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnbalancedPolicy {
    /// Fail with [`crate::Error::UnbalancedInput`]
    Reject,
    /// Settle what can be matched and report the leftover as residual
    Truncate,
}

impl FromStr for UnbalancedPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(UnbalancedPolicy::Reject),
            "truncate" => Ok(UnbalancedPolicy::Truncate),
            other => Err(crate::Error::Config(format!(
                "Unknown unbalanced policy: {}",
                other
            ))),
        }
    }
}

/// Settlement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Largest balance magnitude treated as settled (default 0.01)
    pub tolerance: Decimal,

    /// Handling of balances that do not sum to zero
    pub unbalanced_policy: UnbalancedPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_name: "cashflow-settlement".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            tolerance: Decimal::new(1, 2),
            unbalanced_policy: UnbalancedPolicy::Reject,
        }
    }
}

impl EngineConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = EngineConfig::default();

        if let Ok(name) = std::env::var("CASHFLOW_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(tolerance) = std::env::var("CASHFLOW_TOLERANCE") {
            config.tolerance = Decimal::from_str(&tolerance).map_err(|e| {
                crate::Error::Config(format!("Invalid CASHFLOW_TOLERANCE {}: {}", tolerance, e))
            })?;
        }

        if let Ok(policy) = std::env::var("CASHFLOW_UNBALANCED_POLICY") {
            config.unbalanced_policy = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check settings are usable
    pub fn validate(&self) -> crate::Result<()> {
        if self.tolerance.is_sign_negative() {
            return Err(crate::Error::Config(format!(
                "Tolerance must not be negative: {}",
                self.tolerance
            )));
        }
        self.tolerance_money().map(|_| ())
    }

    /// Tolerance in minor units
    pub fn tolerance_money(&self) -> crate::Result<Money> {
        Money::from_decimal(self.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.tolerance_money().unwrap(), Money::ONE_CENT);
        assert_eq!(config.unbalanced_policy, UnbalancedPolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service_name = \"trip-settlement\"").unwrap();
        writeln!(file, "tolerance = \"0.05\"").unwrap();
        writeln!(file, "unbalanced_policy = \"truncate\"").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.service_name, "trip-settlement");
        assert_eq!(config.tolerance_money().unwrap(), Money::from_cents(5));
        assert_eq!(config.unbalanced_policy, UnbalancedPolicy::Truncate);
    }

    #[test]
    fn test_from_file_rejects_negative_tolerance() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tolerance = \"-0.01\"").unwrap();

        let result = EngineConfig::from_file(file.path());
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = EngineConfig::from_file("/nonexistent/cashflow.toml");
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    // Must stay the only test that sets CASHFLOW_* variables
    #[test]
    fn test_from_env() {
        std::env::set_var("CASHFLOW_SERVICE_NAME", "env-settlement");
        std::env::set_var("CASHFLOW_TOLERANCE", "0.10");
        std::env::set_var("CASHFLOW_UNBALANCED_POLICY", "truncate");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.service_name, "env-settlement");
        assert_eq!(config.tolerance_money().unwrap(), Money::from_cents(10));
        assert_eq!(config.unbalanced_policy, UnbalancedPolicy::Truncate);

        std::env::set_var("CASHFLOW_TOLERANCE", "abc");
        assert!(matches!(EngineConfig::from_env(), Err(crate::Error::Config(_))));

        std::env::set_var("CASHFLOW_TOLERANCE", "-0.01");
        assert!(matches!(EngineConfig::from_env(), Err(crate::Error::Config(_))));

        std::env::remove_var("CASHFLOW_TOLERANCE");
        std::env::set_var("CASHFLOW_UNBALANCED_POLICY", "ignore");
        assert!(matches!(EngineConfig::from_env(), Err(crate::Error::Config(_))));

        std::env::remove_var("CASHFLOW_UNBALANCED_POLICY");
        std::env::remove_var("CASHFLOW_SERVICE_NAME");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.service_name, "cashflow-settlement");
        assert_eq!(config.tolerance_money().unwrap(), Money::ONE_CENT);
        assert_eq!(config.unbalanced_policy, UnbalancedPolicy::Reject);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Reject".parse::<UnbalancedPolicy>().unwrap(), UnbalancedPolicy::Reject);
        assert_eq!(
            "truncate".parse::<UnbalancedPolicy>().unwrap(),
            UnbalancedPolicy::Truncate
        );
        assert!("ignore".parse::<UnbalancedPolicy>().is_err());
    }
}
